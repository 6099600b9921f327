use rand::RngExt;

use crate::domain::types::{OTP_CODE_LEN, OtpCode};

/// Produces fresh challenge secrets.
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> OtpCode;
}

/// Uniform over the whole `[0, 10^OTP_CODE_LEN)` range, zero-padded, drawn
/// from the thread-local CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomCodeGenerator;

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> OtpCode {
        let space = 10u32.pow(OTP_CODE_LEN as u32);
        let n = rand::rng().random_range(0..space);
        OtpCode::new(format!("{n:0width$}", width = OTP_CODE_LEN))
    }
}
