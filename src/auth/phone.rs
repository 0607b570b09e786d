//! 手机号格式校验

use crate::error::{Result, ServerError};

/// 校验手机号格式（E.164：+ 开头，7-15 位数字）
///
/// 所有携带手机号的接口在进入业务逻辑前先过这道检查
pub fn validate_phone_number(phone: &str) -> Result<()> {
    let digits = match phone.strip_prefix('+') {
        Some(rest) => rest,
        None => {
            return Err(ServerError::Validation(format!(
                "invalid phone number: {}",
                phone
            )))
        }
    };

    if digits.len() < 7 || digits.len() > 15 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ServerError::Validation(format!(
            "invalid phone number: {}",
            phone
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_numbers() {
        assert!(validate_phone_number("+15550000").is_ok());
        assert!(validate_phone_number("+998901234567").is_ok());
        assert!(validate_phone_number("+8613812345678").is_ok());
    }

    #[test]
    fn test_invalid_numbers() {
        assert!(validate_phone_number("15550000").is_err()); // 缺少 +
        assert!(validate_phone_number("+123").is_err()); // 太短
        assert!(validate_phone_number("+1234567890123456").is_err()); // 太长
        assert!(validate_phone_number("+1555abc000").is_err()); // 非数字
        assert!(validate_phone_number("").is_err());
    }
}
