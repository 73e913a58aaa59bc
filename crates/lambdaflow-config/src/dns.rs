use crate::error::{ConfigError, Result};
use crate::source::EnvSource;

/// TTL 未指定時のデフォルト（秒）
pub const DEFAULT_TTL: u32 = 300;

/// DOMAIN が設定されている場合に必須となる変数（この順にチェックする）
const REQUIRED_KEYS: [&str; 4] = [
    "CLOUDFLARE_API_TOKEN",
    "CLOUDFLARE_ACCOUNT_ID",
    "RECORD_TYPE",
    "RECORD_VALUE",
];

/// DNS レコード管理の設定
///
/// 値が存在する限り `domain`, `record_type`, `record_value`, `api_token`,
/// `account_id` は空でない。
#[derive(Clone, PartialEq, Eq)]
pub struct DnsConfig {
    pub api_token: String,
    pub account_id: String,
    pub domain: String,
    pub subdomain: Option<String>,
    pub record_type: String,
    pub record_value: String,
    pub ttl: u32,
}

impl DnsConfig {
    /// 参照元から DNS 設定を構成する
    ///
    /// `DOMAIN` が無ければ `Ok(None)`（DNS 管理を行わないデプロイ）。
    /// `DOMAIN` があるのに必須変数が欠けていれば、最初に欠けているキー名で
    /// [`ConfigError::MissingConfiguration`] を返す。
    pub fn resolve(source: &EnvSource) -> Result<Option<Self>> {
        let Some(domain) = source.get("DOMAIN") else {
            return Ok(None);
        };

        if let Some(missing) = REQUIRED_KEYS.iter().find(|key| source.get(key).is_none()) {
            return Err(ConfigError::MissingConfiguration(missing.to_string()));
        }
        let required = |key: &str| source.get(key).unwrap_or_default().to_string();

        let ttl = source
            .get("TTL")
            .and_then(|ttl| ttl.trim().parse::<u32>().ok())
            .unwrap_or(DEFAULT_TTL);

        Ok(Some(Self {
            api_token: required("CLOUDFLARE_API_TOKEN"),
            account_id: required("CLOUDFLARE_ACCOUNT_ID"),
            domain: domain.to_string(),
            subdomain: source.get("SUBDOMAIN").map(str::to_string),
            record_type: required("RECORD_TYPE"),
            record_value: required("RECORD_VALUE"),
            ttl,
        }))
    }

    /// プロセス環境変数から DNS 設定を構成する
    pub fn from_env() -> Result<Option<Self>> {
        Self::resolve(&EnvSource::from_process())
    }

    /// サブドメインがあれば `subdomain.domain`、無ければ `domain`
    pub fn full_domain(&self) -> String {
        match &self.subdomain {
            Some(subdomain) => format!("{}.{}", subdomain, self.domain),
            None => self.domain.clone(),
        }
    }
}

// API トークンはログに出さない
impl std::fmt::Debug for DnsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DnsConfig")
            .field("api_token", &"***")
            .field("account_id", &self.account_id)
            .field("domain", &self.domain)
            .field("subdomain", &self.subdomain)
            .field("record_type", &self.record_type)
            .field("record_value", &self.record_value)
            .field("ttl", &self.ttl)
            .finish()
    }
}
