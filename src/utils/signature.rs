use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::collections::BTreeMap;

type HmacSha256 = Hmac<Sha256>;

/// 签名辅助工具（Binance 兼容的 HMAC-SHA256 查询串签名）
pub struct SignatureHelper;

impl SignatureHelper {
    /// hex(HMAC-SHA256(secret, query_string))
    pub fn hmac_sha256(secret: &str, query_string: &str) -> String {
        let mut mac =
            HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC 支持任意长度密钥");
        mac.update(query_string.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// 按键排序并URL编码的查询串
    pub fn build_query_string(params: &BTreeMap<String, String>) -> String {
        params
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// 生成带签名的完整查询串: `{sorted_query}&signature={hex}`
    pub fn signed_query(secret: &str, params: &BTreeMap<String, String>) -> String {
        let query_string = Self::build_query_string(params);
        let signature = Self::hmac_sha256(secret, &query_string);
        if query_string.is_empty() {
            format!("signature={}", signature)
        } else {
            format!("{}&signature={}", query_string, signature)
        }
    }
}
