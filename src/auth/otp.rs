//! 验证码与关联标识生成

use rand::distributions::Alphanumeric;
use rand::Rng;

/// 关联标识长度（8 字节随机数的 URL-safe 编码宽度）
const IDENTIFIER_LEN: usize = 11;

/// 生成 6 位数字验证码（100000..=999999 均匀分布）
pub fn generate_otp() -> String {
    let code: u32 = rand::thread_rng().gen_range(100_000..1_000_000);
    code.to_string()
}

/// 生成关联标识
///
/// 与验证码一起下发，确认时必须原样带回，
/// 用于把一次客户端请求绑定到服务端挑战上
pub fn generate_identifier() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(IDENTIFIER_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_otp_is_six_digits() {
        for _ in 0..1000 {
            let otp = generate_otp();
            assert_eq!(otp.len(), 6);
            let n: u32 = otp.parse().unwrap();
            assert!((100_000..1_000_000).contains(&n));
        }
    }

    #[test]
    fn test_identifier_shape() {
        let id = generate_identifier();
        assert_eq!(id.len(), IDENTIFIER_LEN);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_identifier_distinct_from_otp() {
        // 两个值相互独立，不应该相等
        for _ in 0..100 {
            assert_ne!(generate_otp(), generate_identifier());
        }
    }
}
