#![no_main]

use libfuzzer_sys::fuzz_target;
use parallax_veto::simulation::SimulationConfig;
use parallax_veto::stress::StressConfig;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Parsing and validating arbitrary config text must never panic
        if let Ok(config) = toml::from_str::<StressConfig>(input) {
            let _ = config.validate();
        }
        if let Ok(config) = toml::from_str::<SimulationConfig>(input) {
            let _ = config.validate();
        }
    }
});
