//! Build script for tenbin-sim
//!
//! - Validates tenbin.toml at compile time
//! - Stamps the build time shown on the version screen

use std::fs;
use std::path::Path;

fn main() {
    validate_config();
    stamp_build_time();
}

/// Validate tenbin.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=tenbin.toml");
    println!("cargo:rerun-if-changed=build.rs");

    let config_path = Path::new("tenbin.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: tenbin.toml not found!                                   ║\n\
            ║                                                                  ║\n\
            ║  The simulator embeds tenbin.toml as its default configuration.  ║\n\
            ║  Please create one in the tenbin-sim directory.                  ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read tenbin.toml                               ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in tenbin.toml                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&e.to_string())
            );
        }
    };

    let mut errors = Vec::new();
    validate_app(&config, &mut errors);
    validate_device(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid values in tenbin.toml                            ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.chars().count() > 64 {
                format!("{}...", line.chars().take(61).collect::<String>())
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Check that an optional integer key lies in `min..=max`
fn check_range(table: Option<&toml::Value>, section: &str, key: &str, min: i64, max: i64, errors: &mut Vec<String>) {
    match table.and_then(|t| t.get(key)) {
        None => {}
        Some(toml::Value::Integer(v)) if (min..=max).contains(v) => {}
        Some(toml::Value::Integer(_)) => {
            errors.push(format!("[{}] {} must be {}-{}", section, key, min, max));
        }
        Some(_) => errors.push(format!("[{}] {} must be an integer", section, key)),
    }
}

fn validate_app(config: &toml::Value, errors: &mut Vec<String>) {
    let app = config.get("app");
    check_range(app, "app", "tick_interval_ms", 1, 1000, errors);

    let input = app.and_then(|a| a.get("input"));
    check_range(input, "app.input", "long_press_a_ms", 1, 60_000, errors);
    check_range(input, "app.input", "long_press_b_ms", 1, 60_000, errors);

    let telemetry = app.and_then(|a| a.get("telemetry"));
    check_range(telemetry, "app.telemetry", "accel_every_ticks", 1, 10_000, errors);
    check_range(telemetry, "app.telemetry", "battery_every_ticks", 1, 10_000, errors);

    let provisioning = app.and_then(|a| a.get("provisioning"));
    check_range(provisioning, "app.provisioning", "connect_attempts", 1, 1000, errors);
    check_range(provisioning, "app.provisioning", "http_port", 1, 65_535, errors);
    check_range(provisioning, "app.provisioning", "dns_port", 1, 65_535, errors);
    check_range(provisioning, "app.provisioning", "brightness_step", 0, 255, errors);

    if let Some(prefix) = provisioning.and_then(|p| p.get("ap_ssid_prefix")) {
        match prefix.as_str() {
            // Prefix plus four hex digits must fit an SSID
            Some(p) if p.len() <= 16 => {}
            Some(_) => errors.push("[app.provisioning] ap_ssid_prefix longer than 16 bytes".into()),
            None => errors.push("[app.provisioning] ap_ssid_prefix must be a string".into()),
        }
    }
}

fn validate_device(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(device) = config.get("device") else {
        return;
    };

    if let Some(variant) = device.get("variant") {
        if !matches!(variant.as_str(), Some("emulated" | "physical")) {
            errors.push("[device] variant must be 'emulated' or 'physical'".into());
        }
    }

    if let Some(mac) = device.get("mac") {
        let valid = mac.as_str().is_some_and(|m| {
            let octets: Vec<&str> = m.split(':').collect();
            octets.len() == 6
                && octets
                    .iter()
                    .all(|o| o.len() == 2 && u8::from_str_radix(o, 16).is_ok())
        });
        if !valid {
            errors.push("[device] mac must look like 24:0A:C4:12:F1:C8".into());
        }
    }
}

/// Export `BUILD_TIMESTAMP` as "YYYY/MM/DD HH:MM" (UTC)
fn stamp_build_time() {
    let stamp = chrono::Utc::now().format("%Y/%m/%d %H:%M");
    println!("cargo:rustc-env=BUILD_TIMESTAMP={}", stamp);
}
