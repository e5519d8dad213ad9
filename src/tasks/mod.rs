pub mod feed_monitor;
