//! Optional API backend: one Lambda function behind an HTTP API.

use serde_json::json;

use super::compose::standard_tags;
use super::ids;
use super::model::{get_att, sub, Resource};
use super::naming;
use crate::config::EnvironmentConfig;

const BASIC_EXECUTION_POLICY: &str =
    "arn:${AWS::Partition}:iam::aws:policy/service-role/AWSLambdaBasicExecutionRole";

pub fn function_name(config: &EnvironmentConfig) -> String {
    format!("{}-api", naming::resource_prefix(config))
}

pub fn function_role(config: &EnvironmentConfig) -> Resource {
    Resource::new(
        "AWS::IAM::Role",
        json!({
            "AssumeRolePolicyDocument": {
                "Version": "2012-10-17",
                "Statement": [{
                    "Effect": "Allow",
                    "Principal": { "Service": "lambda.amazonaws.com" },
                    "Action": "sts:AssumeRole"
                }]
            },
            "ManagedPolicyArns": [sub(BASIC_EXECUTION_POLICY)],
            "Tags": standard_tags(config)
        }),
    )
}

/// Declared up front so retention applies before the function first logs.
pub fn function_log_group(config: &EnvironmentConfig) -> Resource {
    Resource::new(
        "AWS::Logs::LogGroup",
        json!({
            "LogGroupName": format!("/aws/lambda/{}", function_name(config)),
            "RetentionInDays": config.api.log_retention_days,
            "Tags": standard_tags(config)
        }),
    )
    .with_policy(super::bucket::removal_policy(config.environment))
}

pub fn function(config: &EnvironmentConfig) -> Resource {
    let api = &config.api;
    Resource::new(
        "AWS::Lambda::Function",
        json!({
            "FunctionName": function_name(config),
            "Runtime": api.runtime,
            "Handler": api.handler,
            "MemorySize": api.memory_size,
            "Timeout": api.timeout,
            "Role": get_att(ids::API_FUNCTION_ROLE, "Arn"),
            "Code": {
                "S3Bucket": api.code_bucket,
                "S3Key": api.code_key
            },
            "Environment": {
                "Variables": { "ENVIRONMENT": config.environment.as_str() }
            },
            "Tags": standard_tags(config)
        }),
    )
    .depends_on(ids::API_FUNCTION_LOG_GROUP)
}

/// Quick-create HTTP API: `$default` route and stage proxying to the function.
pub fn http_api(config: &EnvironmentConfig) -> Resource {
    Resource::new(
        "AWS::ApiGatewayV2::Api",
        json!({
            "Name": function_name(config),
            "ProtocolType": "HTTP",
            "Target": get_att(ids::API_FUNCTION, "Arn"),
            "Tags": {
                "Environment": config.environment.as_str(),
                "Project": config.project,
                "ManagedBy": super::compose::MANAGED_BY
            }
        }),
    )
}

pub fn invoke_permission() -> Resource {
    Resource::new(
        "AWS::Lambda::Permission",
        json!({
            "Action": "lambda:InvokeFunction",
            "FunctionName": { "Ref": ids::API_FUNCTION },
            "Principal": "apigateway.amazonaws.com",
            "SourceArn": sub(&format!(
                "arn:${{AWS::Partition}}:execute-api:${{AWS::Region}}:${{AWS::AccountId}}:${{{}}}/*",
                ids::HTTP_API
            ))
        }),
    )
}
