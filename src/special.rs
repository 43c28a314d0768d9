use std::f64::consts::PI;

/// Log-gamma via the Lanczos approximation (g = 7, 9 coefficients).
#[allow(clippy::excessive_precision, clippy::unreadable_literal)]
pub fn ln_gamma(x: f64) -> f64 {
    const COEFFS: [f64; 9] = [
        0.999_999_999_999_809_93,
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_13,
        -176.615_029_162_140_59,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_571_6e-6,
        1.505_632_735_149_311_6e-7,
    ];

    if x < 0.5 {
        // reflection
        PI.ln() - (PI * x).sin().abs().ln() - ln_gamma(1.0 - x)
    } else {
        let x = x - 1.0;
        let mut ag = COEFFS[0];
        for (i, c) in COEFFS.iter().enumerate().skip(1) {
            #[allow(clippy::cast_precision_loss)]
            let denom = x + i as f64;
            ag += c / denom;
        }
        let t = x + 7.5;
        0.5 * (2.0 * PI).ln() + (x + 0.5) * t.ln() - t + ag.ln()
    }
}

/// Inverse logit.
pub fn expit(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Mean of a Weibull distribution with the given shape and scale.
pub fn weibull_mean(shape: f64, scale: f64) -> f64 {
    ln_gamma(1.0 + shape.recip()).exp() * scale
}
