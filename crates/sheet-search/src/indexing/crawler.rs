//! Folder discovery

use crate::error::Result;
use crate::providers::SpreadsheetProvider;
use crate::types::DocumentRef;

/// Lists the spreadsheets of a folder through the provider
pub struct FolderCrawler<'a> {
    provider: &'a dyn SpreadsheetProvider,
}

impl<'a> FolderCrawler<'a> {
    pub fn new(provider: &'a dyn SpreadsheetProvider) -> Self {
        Self { provider }
    }

    /// All-or-nothing listing; the folder id and provider errors pass through unmodified
    pub async fn list_documents(&self, folder_id: &str) -> Result<Vec<DocumentRef>> {
        let documents = self.provider.list_documents_in_folder(folder_id).await?;
        tracing::info!(
            "Found {} spreadsheets in folder {} via {}",
            documents.len(),
            folder_id,
            self.provider.name()
        );
        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::testing::{MockDocument, MockProvider};

    #[tokio::test]
    async fn test_lists_folder_documents_in_order() {
        let provider = MockProvider::new()
            .with_document("folder-1", MockDocument::new("F1", "Budget"))
            .with_failing_document("folder-1", "F2", "Broken")
            .with_document("folder-2", MockDocument::new("F3", "Elsewhere"));

        let documents = FolderCrawler::new(&provider)
            .list_documents("folder-1")
            .await
            .unwrap();

        assert_eq!(
            documents,
            vec![DocumentRef::new("F1", "Budget"), DocumentRef::new("F2", "Broken")]
        );
        assert!(FolderCrawler::new(&provider)
            .list_documents("unknown")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_folder_id_is_passed_through() {
        let provider =
            MockProvider::new().with_document("folder-1", MockDocument::new("F1", "Budget"));
        let crawler = FolderCrawler::new(&provider);

        assert!(crawler.list_documents(" folder-1 ").await.unwrap().is_empty());
        assert!(crawler.list_documents("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_authentication_error_passes_through() {
        let provider = MockProvider::new().with_listing_failure("key revoked");
        let result = FolderCrawler::new(&provider).list_documents("folder-1").await;
        match result {
            Err(Error::Authentication(message)) => assert_eq!(message, "key revoked"),
            other => panic!("expected authentication error, got {:?}", other),
        }
    }
}
