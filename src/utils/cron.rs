pub fn build_cron_expr(seconds: u64) -> (String, String) {
    let desc = if seconds < 60 {
        format!("every {} seconds", seconds)
    } else if seconds % 3600 == 0 {
        format!("every {} hours", seconds / 3600)
    } else if seconds % 60 == 0 {
        format!("every {} minutes", seconds / 60)
    } else {
        format!("every {} minutes {} seconds", seconds / 60, seconds % 60)
    };

    let expr = if seconds < 60 {
        format!("*/{} * * * * *", seconds)
    } else if seconds % 3600 == 0 {
        format!("0 0 */{} * * *", seconds / 3600)
    } else {
        format!("0 */{} * * * *", seconds / 60)
    };

    (desc, expr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_minute_schedule_uses_second_field() {
        let (desc, expr) = build_cron_expr(30);
        assert_eq!(desc, "every 30 seconds");
        assert_eq!(expr, "*/30 * * * * *");
    }

    #[test]
    fn minute_schedule_uses_minute_field() {
        let (desc, expr) = build_cron_expr(300);
        assert_eq!(desc, "every 5 minutes");
        assert_eq!(expr, "0 */5 * * * *");
    }

    #[test]
    fn hour_schedule_uses_hour_field() {
        let (desc, expr) = build_cron_expr(21600);
        assert_eq!(desc, "every 6 hours");
        assert_eq!(expr, "0 0 */6 * * *");
    }
}
