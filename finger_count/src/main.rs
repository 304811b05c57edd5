//! Print the gesture rule table for every finger pattern.

use finger_count::{classify_gesture, Finger, FingerFlags};

fn main() {
    println!();
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║          Finger Pattern → Gesture Table              ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    print!("  ");
    for finger in Finger::ALL {
        print!("{:>7}", finger.name());
    }
    println!("  count  gesture");
    println!("  {}", "─".repeat(60));

    let mut patterns: Vec<FingerFlags> = FingerFlags::all_patterns().collect();
    patterns.sort_by_key(|f| f.count());

    for flags in patterns {
        print!("  ");
        for finger in Finger::ALL {
            print!("{:>7}", if flags.is_up(finger) { "up" } else { "·" });
        }
        println!("  {:>5}  {}", flags.count(), classify_gesture(flags));
    }
    println!();
}
