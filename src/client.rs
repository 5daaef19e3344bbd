use crate::config::ClientConfig;
use crate::connection::Connection;
use crate::error::{BraviaError, Result};
use crate::protocol::{self, service, Request};
use crate::types::{
    AppInfo, ContentItem, ContentUri, NetworkInfo, PlayingInfo, PowerStatus, RemoteCommand,
    Source, SystemInfo, VolumeInfo,
};
use crate::wol;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Remote command names understood by `getRemoteControllerInfo`
pub mod command {
    pub const TV_POWER: &str = "TvPower";
    pub const POWER_OFF: &str = "PowerOff";
    pub const VOLUME_UP: &str = "VolumeUp";
    pub const VOLUME_DOWN: &str = "VolumeDown";
    pub const MUTE: &str = "Mute";
    pub const PLAY: &str = "Play";
    pub const PAUSE: &str = "Pause";
    pub const TV_PAUSE: &str = "TvPause";
    pub const NEXT: &str = "Next";
    pub const PREV: &str = "Prev";
}

/// IRCC code sent for `TvPower` when the command table is unavailable
pub const DEFAULT_POWER_CODE: &str = "AAAAAQAAAAEAAAAVAw==";

/// Tuner sources included in the source mapping
pub const TV_SOURCES: &[&str] = &[
    "tv:dvbc",
    "tv:dvbt",
    "tv:dvbs",
    "tv:isdbt",
    "tv:isdbbs",
    "tv:isdbcs",
];

/// Physical inputs included in the source mapping
pub const EXT_INPUT_SOURCES: &[&str] = &[
    "extInput:hdmi",
    "extInput:composite",
    "extInput:component",
];

/// URI prefixes that identify installed applications
pub const APP_URI_PREFIXES: &[&str] = &["com.sony.dtv.", "localapp://"];

const DIAL_APP_LIST_PATH: &str = "DIAL/sony/applist";
const DIAL_APPS_PATH: &str = "DIAL/apps";

/// Lazily built lookup tables. Each is filled on first use and kept until
/// refreshed or invalidated.
#[derive(Default)]
struct Cache {
    commands: Mutex<Vec<RemoteCommand>>,
    sources: Mutex<IndexMap<String, ContentUri>>,
    apps: Mutex<IndexMap<String, String>>,
}

/// Client for one Sony Bravia TV
///
/// Cloning is cheap; clones share the session cookie and caches.
///
/// # Example
///
/// ```no_run
/// use braviarc::BraviaClient;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = BraviaClient::new("192.168.1.20")?;
///     client.connect(Some("1234"), "my-app", "My App").await?;
///
///     client.volume_up().await?;
///     client.select_source("HDMI 1").await?;
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct BraviaClient {
    connection: Arc<Connection>,
    cache: Arc<Cache>,
}

impl BraviaClient {
    /// Create a client for the given host with default settings
    pub fn new(host: impl Into<String>) -> Result<Self> {
        Self::with_config(ClientConfig::new(host))
    }

    /// Create a client from a full config
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            connection: Arc::new(Connection::new(config)?),
            cache: Arc::new(Cache::default()),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        self.connection.config()
    }

    /// Fresh client id of the form `<nickname>:<uuid>`
    pub fn generate_client_id(nickname: &str) -> String {
        format!("{}:{}", nickname, Uuid::new_v4())
    }

    // ========== Session ==========

    /// Register with the TV and keep the session cookie.
    ///
    /// Pass the PIN shown on screen, or `None` to make the TV display one.
    pub async fn connect(&self, pin: Option<&str>, client_id: &str, nickname: &str) -> Result<()> {
        let request = Request::new("actRegister").with_param_list(vec![
            json!({
                "clientid": client_id,
                "nickname": nickname,
                "level": "private",
            }),
            json!([{ "value": "yes", "function": "WOL" }]),
        ]);

        self.connection.register(request, pin).await
    }

    /// Whether a session cookie has been captured. Says nothing about reachability.
    pub async fn is_connected(&self) -> bool {
        self.connection.auth_cookie().await.is_some()
    }

    /// Session cookie, for persisting a pairing across restarts
    pub async fn auth_cookie(&self) -> Option<String> {
        self.connection.auth_cookie().await
    }

    /// Restore a session cookie saved from an earlier pairing
    pub async fn set_auth_cookie(&self, cookie: impl Into<String>) {
        self.connection.set_auth_cookie(Some(cookie.into())).await;
    }

    // ========== Transport ==========

    /// Call a JSON-RPC method and return the raw `result` array
    pub async fn request(
        &self,
        service: &str,
        method: &str,
        params: Option<Value>,
    ) -> Result<Vec<Value>> {
        let mut request = Request::new(method);
        if let Some(params) = params {
            request = request.with_params(params);
        }
        self.connection.call(service, request).await
    }

    /// Send a raw IRCC code
    pub async fn send_req_ircc(&self, code: &str) -> Result<String> {
        self.connection.send_ircc(code).await
    }

    // ========== Remote commands ==========

    /// Re-read the remote controller table from the TV
    pub async fn refresh_commands(&self) -> Result<Vec<RemoteCommand>> {
        let mut commands = self.cache.commands.lock().await;
        *commands = self.fetch_commands().await?;
        Ok(commands.clone())
    }

    async fn fetch_commands(&self) -> Result<Vec<RemoteCommand>> {
        let results = self
            .request(service::SYSTEM, "getRemoteControllerInfo", None)
            .await?;
        let list = results.into_iter().nth(1).ok_or_else(|| {
            BraviaError::InvalidResponse("No command list in getRemoteControllerInfo".to_string())
        })?;

        let commands: Vec<RemoteCommand> = serde_json::from_value(list)?;
        tracing::debug!("Loaded {} remote commands", commands.len());
        Ok(commands)
    }

    /// Remote controller table, loaded on first use
    pub async fn get_command_list(&self) -> Result<Vec<RemoteCommand>> {
        let mut commands = self.cache.commands.lock().await;
        if commands.is_empty() {
            *commands = self.fetch_commands().await?;
        }
        Ok(commands.clone())
    }

    /// IRCC code for a command name, or `None` if the TV doesn't know it
    pub async fn get_command_code(&self, name: &str) -> Result<Option<String>> {
        let mut commands = self.cache.commands.lock().await;
        if commands.is_empty() {
            *commands = self.fetch_commands().await?;
        }

        Ok(commands
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.value.clone()))
    }

    /// Resolve a command name and send it via IRCC
    pub async fn send_command(&self, name: &str) -> Result<()> {
        let code = self
            .get_command_code(name)
            .await?
            .ok_or_else(|| BraviaError::CommandNotFound(name.to_string()))?;

        self.send_req_ircc(&code).await?;
        Ok(())
    }

    // ========== Sources ==========

    /// All content of one source, following pagination until an empty page
    pub async fn get_source(&self, source: &str) -> Result<Vec<ContentItem>> {
        let mut items: Vec<ContentItem> = Vec::new();
        let mut index: u64 = 0;

        loop {
            let params = json!({ "source": source, "stIdx": index });
            let page = match self
                .request(service::AV_CONTENT, "getContentList", Some(params))
                .await
                .and_then(|results| parse_first::<Vec<ContentItem>>(results, "getContentList"))
            {
                Ok(page) => page,
                // Some sets answer past-the-end pages with an error instead of an empty list
                Err(e) if !items.is_empty() => {
                    tracing::debug!("Stopping {} pagination at {}: {}", source, index, e);
                    break;
                }
                Err(e) => return Err(e),
            };

            let Some(last) = page.last() else {
                break;
            };

            let next = last.index + 1;
            if next <= index {
                tracing::warn!("Content index did not advance for {} at {}", source, index);
                items.extend(page);
                break;
            }

            index = next;
            items.extend(page);
        }

        tracing::debug!("Source {} has {} items", source, items.len());
        Ok(items)
    }

    async fn source_list(&self, scheme: &str) -> Result<Vec<Value>> {
        let results = self
            .request(
                service::AV_CONTENT,
                "getSourceList",
                Some(json!({ "scheme": scheme })),
            )
            .await?;
        parse_first(results, "getSourceList")
    }

    /// Installed applications from `getApplicationList`
    pub async fn get_application_list(&self) -> Result<Vec<AppInfo>> {
        let results = self
            .request(service::APP_CONTROL, "getApplicationList", None)
            .await?;
        parse_first(results, "getApplicationList")
    }

    /// Build the title → URI mapping from tuners, physical inputs and apps.
    ///
    /// A scheme that fails is logged and skipped; the call only fails when
    /// every scheme does.
    pub async fn load_source_list(&self) -> Result<IndexMap<String, ContentUri>> {
        let mut content: Vec<(String, ContentUri)> = Vec::new();
        let mut last_error: Option<BraviaError> = None;
        let mut any_ok = false;

        match self.source_list("tv").await {
            Ok(sources) => {
                any_ok = true;
                for (source, _) in parse_sources(sources) {
                    if !TV_SOURCES.contains(&source.source.as_str()) {
                        continue;
                    }
                    match self.get_source(&source.source).await {
                        Ok(items) => content.extend(items.into_iter().map(|i| (i.title, i.uri))),
                        Err(e) => tracing::warn!("Skipping source {}: {}", source.source, e),
                    }
                }
            }
            Err(e) => last_error = Some(e),
        }

        match self.source_list("extInput").await {
            Ok(sources) => {
                any_ok = true;
                for (source, raw) in parse_sources(sources) {
                    if !EXT_INPUT_SOURCES.contains(&source.source.as_str()) {
                        continue;
                    }
                    let page = self
                        .request(service::AV_CONTENT, "getContentList", Some(raw))
                        .await
                        .and_then(|r| parse_first::<Vec<ContentItem>>(r, "getContentList"));
                    match page {
                        Ok(items) => content.extend(items.into_iter().map(|i| (i.title, i.uri))),
                        Err(e) => tracing::warn!("Skipping input {}: {}", source.source, e),
                    }
                }
            }
            Err(e) => last_error = Some(e),
        }

        match self.get_application_list().await {
            Ok(apps) => {
                any_ok = true;
                content.extend(apps.into_iter().map(|a| (a.title, a.uri)));
            }
            Err(e) => last_error = Some(e),
        }

        if !any_ok {
            if let Some(e) = last_error {
                return Err(e);
            }
        }

        Ok(build_mapping(content))
    }

    /// Rebuild the cached source mapping
    pub async fn refresh_sources(&self) -> Result<IndexMap<String, ContentUri>> {
        let mut sources = self.cache.sources.lock().await;
        *sources = self.load_source_list().await?;
        Ok(sources.clone())
    }

    /// Cached source mapping, built on first use
    pub async fn get_source_list(&self) -> Result<IndexMap<String, ContentUri>> {
        let mut sources = self.cache.sources.lock().await;
        if sources.is_empty() {
            *sources = self.load_source_list().await?;
        }
        Ok(sources.clone())
    }

    /// Switch to the source or app with the given title
    pub async fn select_source(&self, title: &str) -> Result<()> {
        let uri = self
            .get_source_list()
            .await?
            .get(title)
            .cloned()
            .ok_or_else(|| BraviaError::SourceNotFound(title.to_string()))?;

        self.play_content(&uri).await
    }

    /// Play a content URI. App URIs are launched through `setActiveApp`.
    pub async fn play_content(&self, uri: &str) -> Result<()> {
        if is_app_uri(uri) {
            self.request(
                service::APP_CONTROL,
                "setActiveApp",
                Some(json!({ "uri": uri })),
            )
            .await?;
        } else {
            self.request(
                service::AV_CONTENT,
                "setPlayContent",
                Some(json!({ "uri": uri })),
            )
            .await?;
        }
        Ok(())
    }

    // ========== Status ==========

    /// What is currently on screen
    pub async fn get_playing_info(&self) -> Result<PlayingInfo> {
        let results = self
            .request(service::AV_CONTENT, "getPlayingContentInfo", None)
            .await?;
        parse_first(results, "getPlayingContentInfo")
    }

    /// Power state; `active`, `standby` or `off`
    pub async fn get_power_status(&self) -> Result<PowerStatus> {
        let results = self
            .request(service::SYSTEM, "getPowerStatus", None)
            .await?;
        let data: Value = parse_first(results, "getPowerStatus")?;

        match data.get("status") {
            Some(status) => Ok(serde_json::from_value(status.clone())?),
            None => Err(BraviaError::InvalidResponse(
                "No status in getPowerStatus".to_string(),
            )),
        }
    }

    pub async fn get_system_info(&self) -> Result<SystemInfo> {
        let results = self
            .request(service::SYSTEM, "getSystemInformation", None)
            .await?;
        parse_first(results, "getSystemInformation")
    }

    /// Settings of the wired interface
    pub async fn get_network_info(&self) -> Result<NetworkInfo> {
        let results = self
            .request(
                service::SYSTEM,
                "getNetworkSettings",
                Some(json!({ "netif": "eth0" })),
            )
            .await?;
        let interfaces: Vec<NetworkInfo> = parse_first(results, "getNetworkSettings")?;

        interfaces.into_iter().next().ok_or_else(|| {
            BraviaError::InvalidResponse("No interface in getNetworkSettings".to_string())
        })
    }

    /// Volume of the `speaker` target, if the TV reports one
    pub async fn get_volume_info(&self) -> Result<Option<VolumeInfo>> {
        let results = self
            .request(service::AUDIO, "getVolumeInformation", None)
            .await?;
        let targets: Vec<VolumeInfo> = parse_first(results, "getVolumeInformation")?;

        Ok(targets.into_iter().find(|t| t.target == "speaker"))
    }

    // ========== Volume ==========

    /// Set the speaker volume from a 0..=1 fraction
    pub async fn set_volume_level(&self, level: f64) -> Result<()> {
        let volume = volume_percent(level);
        self.request(
            service::AUDIO,
            "setAudioVolume",
            Some(json!({ "target": "speaker", "volume": volume })),
        )
        .await?;
        Ok(())
    }

    /// Set mute explicitly (the IRCC `Mute` button only toggles)
    pub async fn set_mute(&self, mute: bool) -> Result<()> {
        self.request(service::AUDIO, "setAudioMute", Some(json!({ "status": mute })))
            .await?;
        Ok(())
    }

    pub async fn volume_up(&self) -> Result<()> {
        self.send_command(command::VOLUME_UP).await
    }

    pub async fn volume_down(&self) -> Result<()> {
        self.send_command(command::VOLUME_DOWN).await
    }

    /// Toggle mute
    pub async fn mute_volume(&self) -> Result<()> {
        self.send_command(command::MUTE).await
    }

    // ========== Power ==========

    /// Wake the TV with Wake-on-LAN, then press power if it is still not active
    pub async fn turn_on(&self) -> Result<()> {
        match self.wake_on_lan().await {
            Ok(()) | Err(BraviaError::MissingMac) => {}
            Err(e) => tracing::warn!("Wake-on-LAN failed: {}", e),
        }

        if self.current_power_status().await.is_active() {
            return Ok(());
        }

        let code = self.power_code().await;
        self.send_req_ircc(&code).await?;
        Ok(())
    }

    /// Broadcast a Wake-on-LAN packet to the configured MAC
    pub async fn wake_on_lan(&self) -> Result<()> {
        let mac = self.config().mac.as_deref().ok_or(BraviaError::MissingMac)?;
        wol::wake(mac).await
    }

    /// Power on without Wake-on-LAN: power button plus `setPowerStatus`
    pub async fn turn_on_command(&self) -> Result<()> {
        if self.current_power_status().await.is_active() {
            return Ok(());
        }

        let code = self.power_code().await;
        self.send_req_ircc(&code).await?;
        self.request(
            service::SYSTEM,
            "setPowerStatus",
            Some(json!({ "status": true })),
        )
        .await?;
        Ok(())
    }

    pub async fn turn_off(&self) -> Result<()> {
        self.send_command(command::POWER_OFF).await
    }

    /// Power status with failures read as `off`
    async fn current_power_status(&self) -> PowerStatus {
        match self.get_power_status().await {
            Ok(status) => status,
            Err(e) => {
                tracing::debug!("Power status unavailable, assuming off: {}", e);
                PowerStatus::Off
            }
        }
    }

    async fn power_code(&self) -> String {
        match self.get_command_code(command::TV_POWER).await {
            Ok(Some(code)) => code,
            Ok(None) => DEFAULT_POWER_CODE.to_string(),
            Err(e) => {
                tracing::debug!("Using default power code: {}", e);
                DEFAULT_POWER_CODE.to_string()
            }
        }
    }

    // ========== Playback ==========

    pub async fn media_play(&self) -> Result<()> {
        self.send_command(command::PLAY).await
    }

    pub async fn media_pause(&self) -> Result<()> {
        self.send_command(command::PAUSE).await
    }

    /// Pause live TV (time shift)
    pub async fn media_tvpause(&self) -> Result<()> {
        self.send_command(command::TV_PAUSE).await
    }

    pub async fn media_next_track(&self) -> Result<()> {
        self.send_command(command::NEXT).await
    }

    pub async fn media_previous_track(&self) -> Result<()> {
        self.send_command(command::PREV).await
    }

    // ========== DIAL apps ==========

    /// App name → DIAL id, read from the DIAL app list
    pub async fn load_app_list(&self) -> Result<IndexMap<String, String>> {
        let xml = self.connection.dial_get(DIAL_APP_LIST_PATH).await?;
        let apps = protocol::parse_dial_app_list(&xml)?;
        tracing::debug!("Loaded {} DIAL apps", apps.len());
        Ok(apps.into_iter().collect())
    }

    /// Re-read the cached DIAL app list
    pub async fn refresh_app_list(&self) -> Result<IndexMap<String, String>> {
        let mut apps = self.cache.apps.lock().await;
        *apps = self.load_app_list().await?;
        Ok(apps.clone())
    }

    /// Cached DIAL app list, loaded on first use
    pub async fn get_app_list(&self) -> Result<IndexMap<String, String>> {
        let mut apps = self.cache.apps.lock().await;
        if apps.is_empty() {
            *apps = self.load_app_list().await?;
        }
        Ok(apps.clone())
    }

    /// Launch an app by its DIAL name
    pub async fn start_app(&self, name: &str) -> Result<String> {
        let id = self
            .get_app_list()
            .await?
            .get(name)
            .cloned()
            .ok_or_else(|| BraviaError::AppNotFound(name.to_string()))?;

        tracing::info!("Starting app {} ({})", name, id);
        self.connection
            .dial_post(&format!("{}/{}", DIAL_APPS_PATH, id))
            .await
    }

    /// Drop all cached tables; the next lookup reloads them from the TV
    pub async fn invalidate_caches(&self) {
        self.cache.commands.lock().await.clear();
        self.cache.sources.lock().await.clear();
        self.cache.apps.lock().await.clear();
    }
}

/// Deserialize `result[0]`
fn parse_first<T: DeserializeOwned>(results: Vec<Value>, method: &str) -> Result<T> {
    let first = results
        .into_iter()
        .next()
        .ok_or_else(|| BraviaError::InvalidResponse(format!("Empty result for {}", method)))?;
    Ok(serde_json::from_value(first)?)
}

/// Typed view of each source record, keeping the raw record for reuse as params
fn parse_sources(raw: Vec<Value>) -> Vec<(Source, Value)> {
    raw.into_iter()
        .filter_map(|value| match serde_json::from_value::<Source>(value.clone()) {
            Ok(source) => Some((source, value)),
            Err(e) => {
                tracing::warn!("Ignoring malformed source {}: {}", value, e);
                None
            }
        })
        .collect()
}

/// Ordered title → URI mapping. A repeated title keeps its first position
/// and takes the later URI.
fn build_mapping(content: Vec<(String, ContentUri)>) -> IndexMap<String, ContentUri> {
    let mut mapping = IndexMap::with_capacity(content.len());
    for (title, uri) in content {
        mapping.insert(title, uri);
    }
    mapping
}

fn is_app_uri(uri: &str) -> bool {
    APP_URI_PREFIXES.iter().any(|p| uri.starts_with(p))
}

/// 0..=1 fraction to a 0..=100 percentage
fn volume_percent(level: f64) -> u8 {
    if level.is_nan() {
        return 0;
    }
    (level.clamp(0.0, 1.0) * 100.0).round() as u8
}
