use crate::domain::model::Record;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Turns a named route plus positional arguments into a URL.
pub trait UrlResolver: Send + Sync {
    fn reverse(&self, route: &str, args: &[String]) -> Result<String>;

    /// Number of arguments the route expects, `None` if the route is unknown.
    fn arity(&self, route: &str) -> Option<usize>;
}

#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<Record>>;

    fn describe(&self) -> String;
}

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}
