pub mod redis_event_worker;
