// src/banner.rs

/// Prints the application startup banner to the console.
pub fn print_banner() {
    let banner = r#"
                    _ _             _               _
  ___ __ _ _ __ __| (_) ___   ___| |__   ___  ___| | __
 / __/ _` | '__/ _` | |/ _ \ / __| '_ \ / _ \/ __| |/ /
| (_| (_| | | | (_| | | (_) | (__| | | |  __/ (__|   <
 \___\__,_|_|  \__,_|_|\___/ \___|_| |_|\___|\___|_|\_\

    Heart Disease Risk Prediction Client
"#;
    println!("{}", banner);
}
