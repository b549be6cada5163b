//! Plain-text reporting for device enumeration and profiled timings

use cinder_runtime::{Device, PlatformInfo, ProfileReport};

/// Print every platform and the devices it exposes
pub fn print_platforms(platforms: &[PlatformInfo]) {
    for platform in platforms {
        println!("Platform: {} ({})", platform.name, platform.vendor);
        for device in &platform.devices {
            println!(
                "  Device: {} [{}], {} MiB global memory, max work-group {}",
                device.name,
                device.device_type,
                device.global_memory_bytes / (1024 * 1024),
                device.max_work_group_size
            );
        }
    }
}

/// Print the device a run will execute on
pub fn print_selected(device: &Device) {
    println!("Using {device}");
}

/// Print a timing report grouped stage -> layer -> total
pub fn print_profile(report: &ProfileReport) {
    println!("==== Execution Info ====");
    for layer in &report.per_layer {
        println!("=== Layer {} ===", layer.layer);
        for stage in report
            .per_stage
            .iter()
            .filter(|s| s.label.layer == layer.layer)
        {
            println!("{:<12} {:.6} ms", stage.label.stage, report.millis(stage.ticks));
        }
        println!("{:<12} {:.6} ms", "layer total", report.millis(layer.ticks));
    }
    println!(
        "Total execution time: {:.6} ms ({:.9} s)",
        report.total_millis(),
        report.total_seconds()
    );
}
