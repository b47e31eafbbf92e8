//! Build script for panelbridge-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates bridge.toml at compile time
//! - Generates `bridge_config.rs` with the validated values

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// GPIOs taken by the two I2C buses
const I2C_PINS: [i64; 4] = [0, 1, 2, 3];

/// Highest bank-0 GPIO
const MAX_PIN: i64 = 29;

/// Keypad pins must sit on one of the three 8-bit ports (GPIO 0-23)
const MAX_KEYPAD_PIN: i64 = 23;

fn main() {
    setup_linker();
    let config = load_config();
    validate_config(&config);
    generate_config(&config);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Read and parse bridge.toml
fn load_config() -> toml::Value {
    println!("cargo:rerun-if-changed=bridge.toml");

    let config_path = Path::new("bridge.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: bridge.toml not found!                                   ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a bridge.toml configuration file.         ║\n\
            ║  Please create one in the panelbridge-firmware directory.        ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read bridge.toml                               ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in bridge.toml                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    }
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Abort the build with a list of problems
fn report(title: &str, errors: &[String]) {
    if errors.is_empty() {
        return;
    }
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

fn integer(config: &toml::Value, section: &str, key: &str) -> Option<i64> {
    config.get(section)?.get(key)?.as_integer()
}

fn boolean(config: &toml::Value, section: &str, key: &str) -> bool {
    config
        .get(section)
        .and_then(|s| s.get(key))
        .and_then(|v| v.as_bool())
        .unwrap_or(false)
}

fn pin_list(config: &toml::Value, key: &str) -> Vec<i64> {
    config
        .get("keypad")
        .and_then(|k| k.get(key))
        .and_then(|v| v.as_array())
        .map(|a| a.iter().filter_map(|p| p.as_integer()).collect())
        .unwrap_or_default()
}

/// Validate bridge.toml contents
fn validate_config(config: &toml::Value) {
    let mut errors = Vec::new();

    for section in ["slave", "timer", "lcd", "power", "keypad"] {
        match config.get(section) {
            Some(toml::Value::Table(_)) => {}
            Some(_) => errors.push(format!("[{}] must be a table", section)),
            None => errors.push(format!("Missing [{}] section", section)),
        }
    }
    report("Missing required sections in bridge.toml", &errors);

    validate_slave(config);
    validate_timer(config);
    validate_lcd(config);
    validate_pins(config);

    println!("cargo:warning=bridge.toml validated successfully");
}

fn validate_slave(config: &toml::Value) {
    let mut errors = Vec::new();

    match integer(config, "slave", "address") {
        Some(addr) if (0x08..=0x77).contains(&addr) => {}
        Some(_) => errors.push("[slave] address must be 0x08-0x77".to_string()),
        None => errors.push("[slave] missing 'address'".to_string()),
    }

    report("Invalid slave configuration", &errors);
}

fn validate_timer(config: &toml::Value) {
    let mut errors = Vec::new();

    let tick_hz = integer(config, "timer", "tick_hz");
    match tick_hz {
        Some(hz) if (16..=1024).contains(&hz) => {}
        Some(_) => errors.push("[timer] tick_hz must be 16-1024".to_string()),
        None => errors.push("[timer] missing 'tick_hz'".to_string()),
    }

    match (integer(config, "timer", "divider"), tick_hz) {
        (Some(div), Some(hz)) if div < 1 || div > hz => {
            errors.push("[timer] divider must be 1-tick_hz".to_string());
        }
        (None, _) => errors.push("[timer] missing 'divider'".to_string()),
        _ => {}
    }

    report("Invalid timer configuration", &errors);
}

fn validate_lcd(config: &toml::Value) {
    let mut errors = Vec::new();

    match integer(config, "lcd", "contrast") {
        Some(c) if (0..=63).contains(&c) => {}
        Some(_) => errors.push("[lcd] contrast must be 0-63".to_string()),
        None => errors.push("[lcd] missing 'contrast'".to_string()),
    }

    match config.get("lcd").and_then(|l| l.get("mode")) {
        Some(toml::Value::String(mode)) if mode == "standard" || mode == "high" => {}
        Some(_) => errors.push("[lcd] mode must be 'standard' or 'high'".to_string()),
        None => errors.push("[lcd] missing 'mode'".to_string()),
    }

    report("Invalid LCD configuration", &errors);
}

fn validate_pins(config: &toml::Value) {
    let mut errors = Vec::new();
    let mut used: Vec<(i64, String)> = I2C_PINS
        .iter()
        .map(|&p| (p, "I2C bus".to_string()))
        .collect();

    let mut claim = |pin: i64, name: String, max: i64, errors: &mut Vec<String>| {
        if !(0..=max).contains(&pin) {
            errors.push(format!("{} pin {} must be 0-{}", name, pin, max));
            return;
        }
        if let Some((_, owner)) = used.iter().find(|(p, _)| *p == pin) {
            errors.push(format!("{} pin {} already used by {}", name, pin, owner));
            return;
        }
        used.push((pin, name));
    };

    for key in ["panel_pin", "backlight_pin"] {
        match integer(config, "power", key) {
            Some(pin) => claim(pin, format!("[power] {}", key), MAX_PIN, &mut errors),
            None => errors.push(format!("[power] missing '{}'", key)),
        }
    }

    for key in ["rows", "cols"] {
        let pins = pin_list(config, key);
        if pins.len() != 4 {
            errors.push(format!("[keypad] {} must list 4 pins", key));
            continue;
        }
        for (i, pin) in pins.into_iter().enumerate() {
            claim(pin, format!("[keypad] {}[{}]", key, i), MAX_KEYPAD_PIN, &mut errors);
        }
    }

    report("Invalid pin configuration", &errors);
}

/// Write bridge_config.rs into OUT_DIR
fn generate_config(config: &toml::Value) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let address = integer(config, "slave", "address").unwrap_or(0x08);
    let tick_hz = integer(config, "timer", "tick_hz").unwrap_or(128);
    let divider = integer(config, "timer", "divider").unwrap_or(2);
    let contrast = integer(config, "lcd", "contrast").unwrap_or(0x28);
    let mode = match config.get("lcd").and_then(|l| l.get("mode")).and_then(|m| m.as_str()) {
        Some("high") => "High",
        _ => "Standard",
    };
    let panel_pin = integer(config, "power", "panel_pin").unwrap_or(4);
    let backlight_pin = integer(config, "power", "backlight_pin").unwrap_or(5);
    let rows = pin_list(config, "rows");
    let cols = pin_list(config, "cols");

    let generated = format!(
        "// Generated from bridge.toml by build.rs\n\
        \n\
        pub const SLAVE_ADDRESS: u8 = {:#04x};\n\
        pub const TICK_HZ: u32 = {};\n\
        pub const TIMER_DIVIDER: u16 = {};\n\
        pub const LCD_CONTRAST: u8 = {:#04x};\n\
        pub const LCD_MODE: panelbridge_hal::I2cMode = panelbridge_hal::I2cMode::{};\n\
        pub const PANEL_PIN: u8 = {};\n\
        pub const PANEL_INVERTED: bool = {};\n\
        pub const BACKLIGHT_PIN: u8 = {};\n\
        pub const BACKLIGHT_INVERTED: bool = {};\n\
        pub const KEYPAD_ROWS: [u8; 4] = {:?};\n\
        pub const KEYPAD_COLS: [u8; 4] = {:?};\n",
        address,
        tick_hz,
        divider,
        contrast,
        mode,
        panel_pin,
        boolean(config, "power", "panel_inverted"),
        backlight_pin,
        boolean(config, "power", "backlight_inverted"),
        rows,
        cols,
    );

    fs::write(out_dir.join("bridge_config.rs"), generated).unwrap();
}
