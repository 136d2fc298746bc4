#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut cfg = configlines::TrackingParser::new();
    if cfg.read_file(data, "fuzz").is_err() {
        return;
    }
    let sections: Vec<String> = cfg.sections().iter().map(|s| s.to_string()).collect();
    for section in &sections {
        for option in cfg.options(section).unwrap_or_default() {
            let location = cfg.get_location(section, option);
            assert!(location.is_ok());
            if let Ok(Some(location)) = location {
                assert!(location.line >= 1);
            }
        }
    }
});
