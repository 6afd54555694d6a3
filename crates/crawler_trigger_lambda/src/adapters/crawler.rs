pub trait CrawlerStarter {
    /// Starts the named crawler. `None` is forwarded untouched so the remote
    /// service's own request validation decides what a missing name means.
    fn start_crawler(&self, name: Option<&str>) -> Result<(), String>;
}
