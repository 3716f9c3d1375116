use std::time::Duration;
use std::thread;
use rand::Rng;
use log::{debug, info};

pub fn random_page_delay() {
    let mut rng = rand::thread_rng();
    let delay_secs = rng.gen_range(2..=5);
    info!("Waiting for {} seconds (Page Delay)...", delay_secs);
    thread::sleep(Duration::from_secs(delay_secs));
}

/// Settle passes before a page snapshot is parsed. The search surface
/// streams extra result cards in after the initial load; each pass gives
/// deferred content time to land.
pub fn settle(passes: u32, pass_secs: u64) {
    for i in 0..passes {
        thread::sleep(Duration::from_secs(pass_secs));
        debug!("Settle pass {}/{} done", i + 1, passes);
    }
}
