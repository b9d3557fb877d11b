//! 面板自身作为 systemd 服务运行时的 sd_notify 通知与看门狗心跳
//!
//! 不在 systemd 下（没有 NOTIFY_SOCKET）或非 Linux 平台时，所有通知都是空操作。

use tracing::{debug, info, warn};

use crate::config::WatchdogConfig;
use crate::shutdown::ShutdownManager;

#[cfg(target_os = "linux")]
mod notify {
    use sd_notify::NotifyState;

    fn send(state: NotifyState) -> std::io::Result<()> {
        if std::env::var_os("NOTIFY_SOCKET").is_none() {
            return Ok(());
        }
        sd_notify::notify(false, &[state])
    }

    pub fn ready() -> std::io::Result<()> {
        send(NotifyState::Ready)
    }

    pub fn stopping() -> std::io::Result<()> {
        send(NotifyState::Stopping)
    }

    pub fn heartbeat() -> std::io::Result<()> {
        send(NotifyState::Watchdog)
    }

    /// systemd 配置的 WatchdogSec（微秒）
    pub fn watchdog_usec() -> Option<u64> {
        let mut usec = 0;
        sd_notify::watchdog_enabled(false, &mut usec).then_some(usec)
    }
}

#[cfg(not(target_os = "linux"))]
mod notify {
    pub fn ready() -> std::io::Result<()> {
        Ok(())
    }

    pub fn stopping() -> std::io::Result<()> {
        Ok(())
    }

    pub fn heartbeat() -> std::io::Result<()> {
        Ok(())
    }

    pub fn watchdog_usec() -> Option<u64> {
        None
    }
}

#[derive(Debug, Clone)]
pub struct SystemdWatchdog {
    config: WatchdogConfig,
    shutdown: ShutdownManager,
}

impl SystemdWatchdog {
    pub fn new(config: WatchdogConfig, shutdown: &ShutdownManager) -> Self {
        Self {
            config,
            shutdown: shutdown.clone(),
        }
    }

    pub fn notify_ready(&self) {
        if let Err(e) = notify::ready() {
            warn!("发送 ready 通知失败: {}", e);
        }
    }

    pub fn notify_stopping(&self) {
        if let Err(e) = notify::stopping() {
            warn!("发送 stopping 通知失败: {}", e);
        }
    }

    /// 心跳间隔必须非零，且小于 WatchdogSec 的一半
    pub fn validate_config(&self) -> Result<(), String> {
        if !self.config.enabled {
            return Ok(());
        }
        if self.config.interval_secs == 0 {
            return Err("看门狗间隔时间不能为0".to_string());
        }
        if let Some(usec) = notify::watchdog_usec() {
            let limit_secs = usec / 1_000_000;
            if self.config.interval_secs * 2 >= limit_secs {
                return Err(format!(
                    "看门狗间隔时间({}s)过大，应小于 systemd WatchdogSec({}s) 的一半",
                    self.config.interval_secs, limit_secs
                ));
            }
        }
        Ok(())
    }

    /// 启用且 systemd 开启了看门狗时，按间隔发送心跳直到退出
    pub fn spawn_heartbeat(&self) {
        if !self.config.enabled {
            debug!("看门狗未启用");
            return;
        }
        if notify::watchdog_usec().is_none() {
            warn!("systemd 看门狗未开启或不在 systemd 环境下运行");
            return;
        }

        let interval = self.config.interval_duration();
        let shutdown = self.shutdown.clone();
        info!("启动看门狗心跳，间隔: {:?}", interval);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = notify::heartbeat() {
                            warn!("看门狗心跳发送失败: {}", e);
                        }
                    }
                    _ = shutdown.wait_for_shutdown() => {
                        info!("停止看门狗心跳");
                        break;
                    }
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_watchdog_always_validates() {
        let config = WatchdogConfig {
            enabled: false,
            interval_secs: 0,
        };
        let watchdog = SystemdWatchdog::new(config, &ShutdownManager::new());
        assert!(watchdog.validate_config().is_ok());
    }

    #[test]
    fn zero_interval_is_rejected_when_enabled() {
        let config = WatchdogConfig {
            enabled: true,
            interval_secs: 0,
        };
        let watchdog = SystemdWatchdog::new(config, &ShutdownManager::new());
        assert!(watchdog.validate_config().is_err());
    }

    #[test]
    fn notifications_are_noops_outside_systemd() {
        let watchdog = SystemdWatchdog::new(WatchdogConfig::default(), &ShutdownManager::new());
        watchdog.notify_ready();
        watchdog.notify_stopping();
    }
}
