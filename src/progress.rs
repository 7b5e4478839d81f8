/// Format time as "xx h xx m xx.xxx s" format
pub fn format_time_used(elapsed: std::time::Duration) -> String {
    let total_secs = elapsed.as_secs_f64();
    let hours = (total_secs / 3600.0) as u64;
    let minutes = ((total_secs % 3600.0) / 60.0) as u64;
    let seconds = total_secs % 60.0;

    if hours > 0 {
        format!("[Time used] {:02} h {:02} m {:06.3} s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("[Time used] {:02} m {:06.3} s", minutes, seconds)
    } else {
        format!("[Time used] {:.3} s", seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn formats_by_magnitude() {
        assert_eq!(format_time_used(Duration::from_millis(1500)), "[Time used] 1.500 s");
        assert_eq!(format_time_used(Duration::from_secs(62)), "[Time used] 01 m 02.000 s");
        assert_eq!(
            format_time_used(Duration::from_secs(3600 + 120 + 5)),
            "[Time used] 01 h 02 m 05.000 s"
        );
    }
}
