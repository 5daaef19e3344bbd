//! Rust library for remote-controlling Sony Bravia TVs
//!
//! This library provides an async API for the control surfaces Bravia sets
//! expose on the local network. It supports:
//!
//! - PIN pairing (session cookie) or pre-shared key authentication
//! - JSON-RPC queries: power, volume, playing content, system and network info
//! - Remote-control button presses over IRCC (SOAP)
//! - Source listing and switching across tuners, HDMI inputs and apps
//! - App listing and launching via DIAL
//! - Power on via Wake-on-LAN
//!
//! # Quick Start
//!
//! ```no_run
//! use braviarc::BraviaClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = BraviaClient::new("192.168.1.20")?;
//!
//!     // First call without a PIN makes the TV show one on screen
//!     let client_id = BraviaClient::generate_client_id("braviarc");
//!     client.connect(Some("1234"), &client_id, "braviarc").await?;
//!
//!     println!("Power: {:?}", client.get_power_status().await?);
//!     let info = client.get_playing_info().await?;
//!     if let Some(time) = info.playing_time() {
//!         println!("{} - {} ({}%)", time.start, time.end, time.percent);
//!     }
//!
//!     client.volume_up().await?;
//!     client.select_source("HDMI 1").await?;
//!     Ok(())
//! }
//! ```
//!
//! # Pre-shared key
//!
//! Sets configured for "Pre-Shared Key" authentication need no pairing:
//!
//! ```no_run
//! use braviarc::{BraviaClient, ClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::new("192.168.1.20")
//!         .with_psk("0000")
//!         .with_mac("AA:BB:CC:DD:EE:FF");
//!     let client = BraviaClient::with_config(config)?;
//!
//!     client.turn_on().await?;
//!     client.set_volume_level(0.25).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **Client**: session, cached lookup tables and all device operations
//! - **Connection**: HTTP transport for JSON-RPC, IRCC and DIAL
//! - **Protocol**: JSON envelopes, SOAP envelope, DIAL XML
//! - **Wol**: Wake-on-LAN magic packets
//! - **Playback**: program start/end clock arithmetic
//! - **Types**: Domain types and data structures

mod client;
mod config;
mod connection;
mod error;
mod playback;
mod protocol;
mod types;
mod wol;

// Public exports
pub use client::{
    command, BraviaClient, APP_URI_PREFIXES, DEFAULT_POWER_CODE, EXT_INPUT_SOURCES, TV_SOURCES,
};
pub use config::{ClientConfig, DEFAULT_TIMEOUT_SECS};
pub use error::{BraviaError, Result};
pub use playback::{calc_time, playing_time, playing_time_at, PlayingTime};
pub use protocol::{service, Request, Response};
pub use types::{
    AppInfo, CommandName, ContentItem, ContentUri, IrccCode, NetworkInfo, PlayingInfo,
    PowerStatus, RemoteCommand, Source, SystemInfo, VolumeInfo,
};
pub use wol::{magic_packet, parse_mac, wake, MAGIC_PACKET_LEN, WOL_PORT};
