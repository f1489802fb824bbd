use crate::{
    client::FmODataClient,
    error::FmODataResult,
    metadata,
    models::{ScriptInvocation, ScriptParameterMode, ScriptRequest, ScriptResponse},
};
use reqwest::Method;
use log::{debug, info};

/// Script execution and discovery
pub struct ScriptApi<'a> {
    client: &'a FmODataClient,
}

impl<'a> ScriptApi<'a> {
    pub fn new(client: &'a FmODataClient) -> Self {
        Self { client }
    }

    /// Run a script in the context of a table
    ///
    /// With [`ScriptParameterMode::Body`] the script is invoked with `POST`
    /// and the parameter travels as `scriptParameterValue`; with
    /// [`ScriptParameterMode::Query`] it is invoked with `GET` and
    /// `$parameter`. A script that answers with an empty body yields `None`.
    pub async fn run_script(
        &self,
        invocation: &ScriptInvocation,
    ) -> FmODataResult<Option<ScriptResponse>> {
        info!("Running script {} on table: {}", invocation.script, invocation.table);
        let path = format!(
            "{}/Script.{}",
            FmODataClient::table_path(&invocation.table),
            urlencoding::encode(&invocation.script)
        );

        let req = match invocation.mode {
            ScriptParameterMode::Body => {
                let req = self.client.request(Method::POST, &path);
                match invocation.param.as_deref() {
                    Some(param) => req.json(&ScriptRequest {
                        script_parameter_value: param,
                    })?,
                    None => req,
                }
            }
            ScriptParameterMode::Query => {
                let req = self.client.request(Method::GET, &path);
                match invocation.param.as_deref() {
                    Some(param) => {
                        req.raw_query(&format!("$parameter={}", urlencoding::encode(param)))
                    }
                    None => req,
                }
            }
        };
        debug!("HTTP {} {}", req.method(), req.path());

        self.client.execute_optional(req).await
    }

    /// Names of the scripts exposed by the database, read fresh from `$metadata`
    pub async fn list_scripts(&self) -> FmODataResult<Vec<String>> {
        info!("Listing scripts");
        let xml = self.client.tables().get_metadata().await?;
        metadata::extract_scripts(&xml)
    }
}
