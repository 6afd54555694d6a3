use aws_sdk_glue::error::DisplayErrorContext;
use crawler_trigger_lambda::adapters::crawler::CrawlerStarter;
use crawler_trigger_lambda::handlers::trigger::{
    handle_trigger_event, ApiGatewayResponse, CRAWLER_ENV_VAR,
};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

struct GlueCrawlerStarter {
    glue_client: aws_sdk_glue::Client,
}

impl CrawlerStarter for GlueCrawlerStarter {
    fn start_crawler(&self, name: Option<&str>) -> Result<(), String> {
        let client = self.glue_client.clone();
        let crawler_name = name.map(str::to_string);

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .start_crawler()
                    .set_name(crawler_name)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| {
                        format!(
                            "failed to start glue crawler: {}",
                            DisplayErrorContext(&error)
                        )
                    })
            })
        })
    }
}

async fn handle_request(event: LambdaEvent<Value>) -> Result<ApiGatewayResponse, Error> {
    let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let starter = GlueCrawlerStarter {
        glue_client: aws_sdk_glue::Client::new(&config),
    };

    let crawler_name = std::env::var(CRAWLER_ENV_VAR).ok();
    let report = handle_trigger_event(
        &event.context.request_id,
        crawler_name.as_deref(),
        &starter,
    );
    Ok(report.response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::run(service_fn(handle_request)).await
}
