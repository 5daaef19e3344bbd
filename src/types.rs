use serde::{Deserialize, Serialize};

/// Remote command name (e.g. "VolumeUp")
pub type CommandName = String;

/// Opaque IRCC code (base64 string)
pub type IrccCode = String;

/// Content URI (e.g. "extInput:hdmi?port=1")
pub type ContentUri = String;

/// TV power state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PowerStatus {
    Active,
    Standby,
    #[default]
    #[serde(other)]
    Off,
}

impl PowerStatus {
    pub fn is_active(self) -> bool {
        self == PowerStatus::Active
    }
}

/// Entry of the TV's remote controller table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteCommand {
    pub name: CommandName,
    pub value: IrccCode,
}

/// Snapshot of what the TV is currently playing
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlayingInfo {
    #[serde(default)]
    pub program_title: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub program_media_type: Option<String>,
    #[serde(default)]
    pub disp_num: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub uri: Option<ContentUri>,
    #[serde(default)]
    pub duration_sec: Option<u64>,
    /// Program start, e.g. `2017-03-24T20:15:00+0100`
    #[serde(default)]
    pub start_date_time: Option<String>,
}

impl PlayingInfo {
    /// Start/end clock and percentage played, when the TV reports a program window
    pub fn playing_time(&self) -> Option<crate::playback::PlayingTime> {
        let start = self.start_date_time.as_deref()?;
        let duration = self.duration_sec?;
        crate::playback::playing_time(start, duration).ok()
    }
}

/// Volume state of one output target
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInfo {
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub volume: i64,
    #[serde(default)]
    pub mute: bool,
    #[serde(default)]
    pub max_volume: Option<i64>,
    #[serde(default)]
    pub min_volume: Option<i64>,
}

/// Result of `getSystemInformation`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub serial: Option<String>,
    #[serde(default)]
    pub mac_addr: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub generation: Option<String>,
}

/// One interface from `getNetworkSettings`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInfo {
    #[serde(default)]
    pub netif: Option<String>,
    #[serde(default)]
    pub hw_addr: Option<String>,
    #[serde(default, rename = "ipAddrV4")]
    pub ip_addr_v4: Option<String>,
    #[serde(default, rename = "ipAddrV6")]
    pub ip_addr_v6: Option<String>,
    #[serde(default)]
    pub netmask: Option<String>,
    #[serde(default)]
    pub gateway: Option<String>,
    #[serde(default)]
    pub dns: Vec<String>,
}

/// Entry of `getSourceList`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Source {
    pub source: String,
}

/// Entry of `getContentList`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub uri: ContentUri,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub index: u64,
    #[serde(default)]
    pub disp_num: Option<String>,
    #[serde(default)]
    pub program_media_type: Option<String>,
}

/// Entry of `getApplicationList`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppInfo {
    pub title: String,
    pub uri: ContentUri,
    #[serde(default)]
    pub icon: Option<String>,
}
