//! RPC-backed address book.

use async_trait::async_trait;
use futures_util::StreamExt;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use abook_core::{
    AddressBook, ContactId, ContactProjection, PageRequest, Query, Result, ServiceUrl, Source,
    SourceId, ViewHandle,
};

use crate::client::RpcClient;
use crate::endpoints::*;
use crate::events::RpcEvents;

/// Client stub forwarding every operation to a remote directory.
///
/// Holds nothing but the binding: the endpoint, an HTTP client and the peer
/// id that owns the views this stub opens.
#[derive(Debug, Clone)]
pub struct RpcAddressBook {
    client: RpcClient,
}

impl RpcAddressBook {
    /// Bind to the service at `url`, verifying that it answers.
    #[instrument(fields(url = %url))]
    pub async fn connect(url: ServiceUrl) -> Result<Self> {
        let peer = Uuid::new_v4().simple().to_string();
        let book = Self {
            client: RpcClient::new(url, peer)?,
        };
        let ready = book.is_ready().await?;
        info!(peer = book.peer(), ready, "Connected to address book");
        Ok(book)
    }

    /// Build a stub over an existing client without probing the service.
    pub fn from_client(client: RpcClient) -> Self {
        Self { client }
    }

    /// Returns the service URL.
    pub fn url(&self) -> &ServiceUrl {
        self.client.url()
    }

    /// Returns this stub's peer id.
    pub fn peer(&self) -> &str {
        self.client.peer()
    }

    /// Release every view opened by this stub.
    pub async fn disconnect(&self) -> Result<usize> {
        let response: CountResponse = self.client.call(DISCONNECT, &Empty {}).await?;
        debug!(released = response.count, "Disconnected");
        Ok(response.count)
    }

    /// Subscribe and wait until the subscription is live.
    pub async fn subscribe_now(&self) -> Result<RpcEvents> {
        RpcEvents::connect(self.url()).await
    }

    async fn flag(&self, method: &str) -> Result<bool> {
        let response: FlagBody = self.client.call(method, &Empty {}).await?;
        Ok(response.value)
    }

    async fn set_flag(&self, method: &str, value: bool) -> Result<()> {
        let _: Empty = self.client.call(method, &FlagBody { value }).await?;
        Ok(())
    }
}

#[async_trait]
impl AddressBook for RpcAddressBook {
    type Events = RpcEvents;

    #[instrument(skip(self, query), fields(peer = %self.peer()))]
    async fn query(&self, query: &Query) -> Result<ViewHandle> {
        let response: QueryResponse = self.client.call(QUERY, query).await?;
        Ok(response.view)
    }

    async fn contacts_details(
        &self,
        view: ViewHandle,
        fields: &[String],
        page: PageRequest,
    ) -> Result<Vec<ContactProjection>> {
        let (start_index, page_size) = page.to_wire();
        let request = ContactsDetailsRequest {
            view,
            fields: fields.to_vec(),
            start_index,
            page_size,
        };
        let response: ContactsDetailsResponse =
            self.client.call(CONTACTS_DETAILS, &request).await?;
        Ok(response.contacts)
    }

    async fn view_count(&self, view: ViewHandle) -> Result<usize> {
        let response: CountResponse = self.client.call(VIEW_COUNT, &ViewRequest { view }).await?;
        Ok(response.count)
    }

    async fn close_view(&self, view: ViewHandle) -> Result<()> {
        let _: Empty = self.client.call(VIEW_CLOSE, &ViewRequest { view }).await?;
        Ok(())
    }

    #[instrument(skip(self, card))]
    async fn create_contact(&self, card: &str, source: Option<&SourceId>) -> Result<ContactId> {
        let request = CreateContactRequest {
            vcard: card.to_string(),
            source_id: source.map(|s| s.to_string()).unwrap_or_default(),
        };
        let response: CreateContactResponse = self.client.call(CREATE_CONTACT, &request).await?;
        Ok(response.id)
    }

    async fn update_contacts(&self, cards: &[String]) -> Result<usize> {
        let request = UpdateContactsRequest {
            vcards: cards.to_vec(),
        };
        let response: CountResponse = self.client.call(UPDATE_CONTACTS, &request).await?;
        Ok(response.count)
    }

    async fn remove_contacts(&self, ids: &[ContactId]) -> Result<usize> {
        let request = RemoveContactsRequest {
            ids: ids.iter().map(|id| id.as_str().to_string()).collect(),
        };
        let response: CountResponse = self.client.call(REMOVE_CONTACTS, &request).await?;
        Ok(response.count)
    }

    async fn available_sources(&self) -> Result<Vec<Source>> {
        let response: SourcesResponse = self.client.call(AVAILABLE_SOURCES, &Empty {}).await?;
        Ok(response.sources)
    }

    async fn create_source(&self, source: Source) -> Result<bool> {
        let response: FlagBody = self.client.call(CREATE_SOURCE, &source).await?;
        Ok(response.value)
    }

    async fn remove_source(&self, id: &SourceId) -> Result<bool> {
        let request = RemoveSourceRequest { id: id.clone() };
        let response: FlagBody = self.client.call(REMOVE_SOURCE, &request).await?;
        Ok(response.value)
    }

    async fn reset(&self) -> Result<bool> {
        self.flag(RESET).await
    }

    async fn is_ready(&self) -> Result<bool> {
        self.flag(IS_READY).await
    }

    async fn set_ready(&self, ready: bool) -> Result<()> {
        self.set_flag(SET_READY, ready).await
    }

    async fn safe_mode(&self) -> Result<bool> {
        self.flag(SAFE_MODE).await
    }

    async fn set_safe_mode(&self, enabled: bool) -> Result<()> {
        self.set_flag(SET_SAFE_MODE, enabled).await
    }

    async fn sort_fields(&self) -> Result<Vec<String>> {
        let response: SortFieldsResponse = self.client.call(SORT_FIELDS, &Empty {}).await?;
        Ok(response.fields)
    }

    async fn release_views(&self, owner: &str) -> Result<usize> {
        if owner == self.peer() {
            return self.disconnect().await;
        }
        Err(abook_core::error::ValidationError::Other {
            message: "a client may only release its own views".to_string(),
        }
        .into())
    }

    fn subscribe(&self) -> Result<Self::Events> {
        let url = self.url().clone();
        let (tx, mut rx) = tokio::sync::mpsc::channel::<Result<abook_core::DirectoryEvent>>(100);

        tokio::spawn(async move {
            match RpcEvents::connect(&url).await {
                Ok(mut stream) => {
                    while let Some(event) = stream.next().await {
                        if tx.send(event).await.is_err() {
                            break;
                        }
                    }
                }
                Err(e) => {
                    let _ = tx.send(Err(e)).await;
                }
            }
        });

        let stream = async_stream::stream! {
            while let Some(event) = rx.recv().await {
                yield event;
            }
        };

        Ok(RpcEvents::new(stream))
    }
}
