/// Current unix time in whole seconds. The model stores timestamps as
/// plain integers (as the source does), but the clock itself is read
/// through `chrono`, matching the teacher's own `chrono::Utc::now()` calls.
pub fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}
