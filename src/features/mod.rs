/// frpc 配置文件读写与保存流程
pub mod frpc_config;
/// 健康检查
pub mod health;
/// 版本探测、下载与安装
pub mod release;
/// systemd 服务控制与连接校验
pub mod service;
