macro_rules! setup {
    ($name:ident, $frames:expr, $k:expr) => {
        let _ = env_logger::builder().is_test(true).try_init();
        let $name: Arc<dyn Replacer> = Arc::new(SyncLRUKReplacer::new($frames, $k));
    };
}

mod tests;
