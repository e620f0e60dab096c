/// Notifications that flow from widgets and watchers to their host.
///
/// Sources:
/// - Widget lifecycle → `Attached`
/// - Config watcher   → `ConfigReloaded`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Widget was attached to its host; configuration is now frozen.
    Attached(String),
    /// Config file changed on disk.
    ConfigReloaded,
}
