use serde::{Deserialize, Deserializer, Serialize};

/// frpc 客户端配置文件（TOML 与 JSON 使用同一套 camelCase 键名）
///
/// 缺失的字段按零值处理；代理名称不做唯一性校验。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct FrpcConfig {
    /// 服务端地址
    #[schema(example = "frp.example.com")]
    pub server_addr: String,
    /// 服务端端口
    #[schema(example = 7000)]
    pub server_port: u16,
    pub transport: Transport,
    pub auth: Auth,
    pub log: Log,
    /// `null` 与缺省一样视为空列表
    #[serde(deserialize_with = "null_as_empty")]
    pub proxies: Vec<Proxy>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Transport {
    /// tcp / kcp / quic / websocket / wss
    #[schema(example = "tcp")]
    pub protocol: String,
    pub tls: Tls,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Tls {
    pub cert_file: String,
    pub key_file: String,
    pub trusted_ca_file: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(default)]
pub struct Auth {
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Log {
    /// 日志输出位置（文件路径或 console）
    pub to: String,
    pub level: String,
    pub max_days: u32,
}

/// 单条代理规则
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Proxy {
    pub name: String,
    #[serde(rename = "type")]
    #[schema(example = "tcp")]
    pub proxy_type: String,
    #[serde(rename = "localIP")]
    #[schema(example = "127.0.0.1")]
    pub local_ip: String,
    pub local_port: u16,
    pub remote_port: u16,
}
