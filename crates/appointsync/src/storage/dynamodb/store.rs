use async_trait::async_trait;
use aws_sdk_dynamodb::config::Region;
use aws_sdk_dynamodb::types::{Delete, Put, TransactWriteItem, Update};
use aws_sdk_dynamodb::Client;
use tokio::sync::OnceCell;

use appointsync_core::item::{Item, Key};
use appointsync_core::storage::{
    ContinuationToken, ItemStore, KeyCondition, Page, Projection, QueryOptions, RenderedRead,
    Result, ScanOptions, StoreError, TransactItem, UpdateExpression,
};

use super::conversions::{
    item_from_dynamo, item_to_dynamo, key_to_dynamo, placeholder_names_to_dynamo,
    placeholder_values_to_dynamo, DynamoItem,
};
use super::error::{
    map_delete_item_error, map_get_item_error, map_put_item_error, map_query_error,
    map_scan_error, map_transact_write_error, map_update_item_error,
};

/// Connection settings; anything unset falls back to the SDK default chain.
#[derive(Debug, Clone, Default)]
pub struct DynamoDbSettings {
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
}

/// DynamoDB-backed [`ItemStore`].
///
/// The client is built on first use and shared by every later call.
pub struct DynamoDbStore {
    settings: DynamoDbSettings,
    client: OnceCell<Client>,
}

impl DynamoDbStore {
    pub fn new(settings: DynamoDbSettings) -> Self {
        Self {
            settings,
            client: OnceCell::new(),
        }
    }

    /// Uses an already configured client.
    pub fn with_client(client: Client) -> Self {
        Self {
            settings: DynamoDbSettings::default(),
            client: OnceCell::new_with(Some(client)),
        }
    }

    async fn client(&self) -> &Client {
        self.client
            .get_or_init(|| async {
                let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
                if let Some(region) = &self.settings.region {
                    loader = loader.region(Region::new(region.clone()));
                }
                if let Some(endpoint_url) = &self.settings.endpoint_url {
                    loader = loader.endpoint_url(endpoint_url);
                }
                let config = loader.load().await;
                tracing::debug!(settings = ?self.settings, "DynamoDB client initialized");
                Client::new(&config)
            })
            .await
    }
}

fn page_from_output(
    items: &[DynamoItem],
    count: i32,
    last_evaluated_key: Option<&DynamoItem>,
) -> Result<Page> {
    let items = items
        .iter()
        .map(item_from_dynamo)
        .collect::<Result<Vec<_>>>()?;
    let next = last_evaluated_key
        .map(item_from_dynamo)
        .transpose()?
        .map(ContinuationToken::from_item);

    Ok(Page {
        items,
        count: usize::try_from(count).unwrap_or_default(),
        next,
    })
}

fn transact_item_to_dynamo(item: &TransactItem) -> Result<TransactWriteItem> {
    let build_error = |e: aws_sdk_dynamodb::error::BuildError| StoreError::InvalidData(e.to_string());

    let write = match item {
        TransactItem::Put { table, item } => TransactWriteItem::builder().put(
            Put::builder()
                .table_name(table)
                .set_item(Some(item_to_dynamo(item)))
                .build()
                .map_err(build_error)?,
        ),
        TransactItem::Update {
            table,
            key,
            attributes,
        } => {
            let update = UpdateExpression::set(attributes)?;
            TransactWriteItem::builder().update(
                Update::builder()
                    .table_name(table)
                    .set_key(Some(key_to_dynamo(key)))
                    .update_expression(update.expression())
                    .set_expression_attribute_names(placeholder_names_to_dynamo(
                        &update.placeholders().names,
                    ))
                    .set_expression_attribute_values(placeholder_values_to_dynamo(
                        &update.placeholders().values,
                    ))
                    .build()
                    .map_err(build_error)?,
            )
        }
        TransactItem::Delete { table, key } => TransactWriteItem::builder().delete(
            Delete::builder()
                .table_name(table)
                .set_key(Some(key_to_dynamo(key)))
                .build()
                .map_err(build_error)?,
        ),
    };

    Ok(write.build())
}

#[async_trait]
impl ItemStore for DynamoDbStore {
    async fn get_item(
        &self,
        table: &str,
        key: &Key,
        projection: Option<&Projection>,
    ) -> Result<Option<Item>> {
        let (projection_expression, names) = match projection {
            Some(projection) => {
                let (expression, names) = projection.render();
                (Some(expression), placeholder_names_to_dynamo(&names))
            }
            None => (None, None),
        };

        let result = self
            .client()
            .await
            .get_item()
            .table_name(table)
            .set_key(Some(key_to_dynamo(key)))
            .set_projection_expression(projection_expression)
            .set_expression_attribute_names(names)
            .send()
            .await
            .map_err(map_get_item_error)?;

        result.item().map(item_from_dynamo).transpose()
    }

    async fn put_item(&self, table: &str, item: &Item) -> Result<()> {
        self.client()
            .await
            .put_item()
            .table_name(table)
            .set_item(Some(item_to_dynamo(item)))
            .send()
            .await
            .map_err(map_put_item_error)?;

        Ok(())
    }

    async fn update_item(&self, table: &str, key: &Key, update: &UpdateExpression) -> Result<()> {
        let placeholders = update.placeholders();

        self.client()
            .await
            .update_item()
            .table_name(table)
            .set_key(Some(key_to_dynamo(key)))
            .update_expression(update.expression())
            .set_expression_attribute_names(placeholder_names_to_dynamo(&placeholders.names))
            .set_expression_attribute_values(placeholder_values_to_dynamo(&placeholders.values))
            .send()
            .await
            .map_err(map_update_item_error)?;

        Ok(())
    }

    async fn delete_item(&self, table: &str, key: &Key) -> Result<()> {
        self.client()
            .await
            .delete_item()
            .table_name(table)
            .set_key(Some(key_to_dynamo(key)))
            .send()
            .await
            .map_err(map_delete_item_error)?;

        Ok(())
    }

    async fn query(
        &self,
        table: &str,
        condition: &KeyCondition,
        options: &QueryOptions,
    ) -> Result<Page> {
        let read = RenderedRead::query(condition, options)?;

        let result = self
            .client()
            .await
            .query()
            .table_name(table)
            .set_index_name(options.index_name.clone())
            .set_key_condition_expression(read.key_condition)
            .set_filter_expression(read.filter_expression)
            .set_projection_expression(read.projection)
            .set_expression_attribute_names(placeholder_names_to_dynamo(&read.placeholders.names))
            .set_expression_attribute_values(placeholder_values_to_dynamo(
                &read.placeholders.values,
            ))
            .set_exclusive_start_key(
                options
                    .start_from
                    .as_ref()
                    .map(|token| item_to_dynamo(token.as_item())),
            )
            .set_scan_index_forward(options.direction.map(|direction| direction.is_forward()))
            .send()
            .await
            .map_err(map_query_error)?;

        page_from_output(result.items(), result.count(), result.last_evaluated_key())
    }

    async fn scan(&self, table: &str, options: &ScanOptions) -> Result<Page> {
        let read = RenderedRead::scan(options)?;

        let result = self
            .client()
            .await
            .scan()
            .table_name(table)
            .set_index_name(options.index_name.clone())
            .set_filter_expression(read.filter_expression)
            .set_projection_expression(read.projection)
            .set_expression_attribute_names(placeholder_names_to_dynamo(&read.placeholders.names))
            .set_expression_attribute_values(placeholder_values_to_dynamo(
                &read.placeholders.values,
            ))
            .set_exclusive_start_key(
                options
                    .start_from
                    .as_ref()
                    .map(|token| item_to_dynamo(token.as_item())),
            )
            .send()
            .await
            .map_err(map_scan_error)?;

        page_from_output(result.items(), result.count(), result.last_evaluated_key())
    }

    /// A cancelled transaction is `Ok(false)`; other failures are errors.
    async fn transact_write(&self, items: &[TransactItem]) -> Result<bool> {
        if items.is_empty() {
            return Ok(true);
        }

        let writes = items
            .iter()
            .map(transact_item_to_dynamo)
            .collect::<Result<Vec<_>>>()?;

        let result = self
            .client()
            .await
            .transact_write_items()
            .set_transact_items(Some(writes))
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(err) => match map_transact_write_error(err) {
                StoreError::TransactionCancelled(reason) => {
                    tracing::warn!(%reason, items = items.len(), "Transaction cancelled");
                    Ok(false)
                }
                other => Err(other),
            },
        }
    }
}
