//! Small command-line remote.
//!
//! ```text
//! BRAVIA_PSK=0000 cargo run --example remote -- 192.168.1.20 status
//! cargo run --example remote -- 192.168.1.20 pair 1234
//! cargo run --example remote -- 192.168.1.20 source "HDMI 1"
//! ```

use braviarc::{BraviaClient, ClientConfig};
use std::env;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: remote <host> <status|pair [pin]|on|off|up|down|mute|sources|source <title>|apps|app <name>|key <command>>";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("braviarc=info")),
        )
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let (Some(host), Some(action)) = (args.first(), args.get(1)) else {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    };
    let arg = args.get(2).map(String::as_str);

    let mut config = ClientConfig::new(host.as_str());
    if let Ok(psk) = env::var("BRAVIA_PSK") {
        config = config.with_psk(psk);
    }
    if let Ok(mac) = env::var("BRAVIA_MAC") {
        config = config.with_mac(mac);
    }
    let client = BraviaClient::with_config(config)?;

    if let Ok(cookie) = env::var("BRAVIA_COOKIE") {
        client.set_auth_cookie(cookie).await;
    }

    match action.as_str() {
        "status" => {
            println!("Power:   {:?}", client.get_power_status().await?);
            if let Some(volume) = client.get_volume_info().await? {
                println!("Volume:  {}{}", volume.volume, if volume.mute { " (muted)" } else { "" });
            }
            let info = client.get_playing_info().await.unwrap_or_default();
            if let Some(title) = info.title.as_deref() {
                print!("Playing: {}", title);
                if let Some(program) = info.program_title.as_deref() {
                    print!(" - {}", program);
                }
                if let Some(time) = info.playing_time() {
                    print!(" [{}-{}, {}%]", time.start, time.end, time.percent);
                }
                println!();
            }
        }
        "pair" => {
            let nickname = "braviarc";
            let client_id = env::var("BRAVIA_CLIENT_ID")
                .unwrap_or_else(|_| BraviaClient::generate_client_id(nickname));
            client.connect(arg, &client_id, nickname).await?;
            println!("Paired as {}", client_id);
            if let Some(cookie) = client.auth_cookie().await {
                println!("BRAVIA_COOKIE={}", cookie);
            }
        }
        "on" => client.turn_on().await?,
        "off" => client.turn_off().await?,
        "up" => client.volume_up().await?,
        "down" => client.volume_down().await?,
        "mute" => client.mute_volume().await?,
        "sources" => {
            for (title, uri) in client.get_source_list().await? {
                println!("{:<30} {}", title, uri);
            }
        }
        "source" => client.select_source(arg.ok_or(USAGE)?).await?,
        "apps" => {
            for (name, id) in client.get_app_list().await? {
                println!("{:<30} {}", name, id);
            }
        }
        "app" => {
            client.start_app(arg.ok_or(USAGE)?).await?;
        }
        "key" => client.send_command(arg.ok_or(USAGE)?).await?,
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }

    Ok(())
}
