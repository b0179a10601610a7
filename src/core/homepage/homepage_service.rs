// Command handlers for every page of the homepage.
//
// Each handler takes primitives, talks to the remote table / file store
// through their ports and returns a typed result. No Discord types in here;
// the front end only translates arguments in and results out.

use crate::core::anniversary::{AnniversaryCalculator, AnniversarySummary};
use crate::core::links;
use crate::core::meals::{self, ChoiceFilter};
use crate::core::records::{
    FileStore, LedgerEntry, Participant, PhotoEntry, PriceTier, Record, RecordCache,
    RestaurantEntry, SheetHandle, SheetRow, TableError, TableStore, UploadError, WishlistEntry,
    Worksheet, WorksheetHandle,
};
use crate::core::travel_map::{MapError, MapPoint, MapSessions};
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HomepageError {
    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Map(#[from] MapError),

    #[error("{0}")]
    Invalid(String),

    #[error("Photo uploads are disabled because no Drive folder is configured")]
    UploadsDisabled,
}

impl HomepageError {
    /// Text shown to the couple when a command fails.
    pub fn user_message(&self) -> String {
        match self {
            HomepageError::Table(TableError::Credential(_))
            | HomepageError::Upload(UploadError::Credential(_)) => {
                "🔑 Can't find the keys! Make sure secrets.json is next to the bot \
                 or that HOMEPAGE_SECRETS has a gcp.json_file entry."
                    .to_string()
            }
            HomepageError::Table(TableError::SpreadsheetNotFound(name)) => format!(
                "📄 Couldn't open the spreadsheet **{name}**. \
                 Check the name and that it is shared with the service account."
            ),
            HomepageError::Table(TableError::WorksheetNotFound(tab)) => format!(
                "📄 The **{tab}** tab doesn't exist yet. Create it in the spreadsheet and try again."
            ),
            HomepageError::Table(TableError::Remote(_)) => {
                "☁️ The spreadsheet didn't answer properly. Try again in a moment.".to_string()
            }
            HomepageError::Upload(UploadError::Share { file_id, .. }) => format!(
                "📸 The photo reached Drive (file `{file_id}`) but couldn't be shared, \
                 so it was not added to the wall. Check the folder's sharing settings."
            ),
            HomepageError::Upload(err) => format!("📸 {err}"),
            HomepageError::Map(err) => format!("🗺️ {err}"),
            HomepageError::Invalid(msg) => format!("⚠️ {msg}"),
            HomepageError::UploadsDisabled => {
                "📸 Photo uploads are turned off (no Drive folder configured). \
                 Paste a link with `/photo link` instead."
                    .to_string()
            }
        }
    }
}

/// Fixed configuration the handlers need.
#[derive(Debug, Clone)]
pub struct HomepageSettings {
    pub spreadsheet: String,
    pub drive_folder_id: Option<String>,
    pub anniversary_start: NaiveDate,
    pub timezone: Tz,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerSummary {
    /// Storage order, oldest first.
    pub entries: Vec<LedgerEntry>,
    pub total: f64,
    pub by_payer: Vec<(Participant, f64)>,
    /// Sheet rows that could not be read and are left out of the totals.
    pub skipped: usize,
}

impl LedgerSummary {
    pub fn from_entries(entries: Vec<LedgerEntry>) -> Self {
        let total: f64 = entries.iter().map(|e| e.amount).sum();
        let by_payer = Participant::ALL
            .into_iter()
            .map(|p| {
                let spent: f64 = entries
                    .iter()
                    .filter(|e| e.payer == p)
                    .map(|e| e.amount)
                    .sum();
                (p, spent)
            })
            .collect();

        Self {
            entries,
            total,
            by_payer,
            skipped: 0,
        }
    }

    /// The latest `limit` entries, newest first.
    pub fn recent(&self, limit: usize) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.iter().rev().take(limit)
    }
}

/// Longest caption the photo wall accepts, in characters.
pub const MAX_CAPTION_CHARS: usize = 200;

fn check_caption(caption: &str) -> Result<(), HomepageError> {
    let length = caption.trim().chars().count();
    if length > MAX_CAPTION_CHARS {
        return Err(HomepageError::Invalid(format!(
            "Captions can be at most {MAX_CAPTION_CHARS} characters (this one has {length})."
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MealPick {
    Restaurant(RestaurantEntry),
    /// The Restaurants tab is missing or empty, so a built-in dish was picked.
    QuickPick(&'static str),
    NoMatch,
}

pub struct HomepageService<T: TableStore, F: FileStore> {
    tables: T,
    files: F,
    settings: HomepageSettings,
    anniversary: AnniversaryCalculator,
    /// Opened handles are never invalidated.
    sheets: RecordCache<String, SheetHandle>,
    worksheets: RecordCache<Worksheet, WorksheetHandle>,
    /// Cleared after every successful append.
    reads: RecordCache<Worksheet, Arc<Vec<Record>>>,
    maps: MapSessions,
}

impl<T: TableStore, F: FileStore> HomepageService<T, F> {
    pub fn new(tables: T, files: F, settings: HomepageSettings) -> Self {
        Self {
            tables,
            files,
            anniversary: AnniversaryCalculator::new(settings.anniversary_start),
            settings,
            sheets: RecordCache::new(),
            worksheets: RecordCache::new(),
            reads: RecordCache::new(),
            maps: MapSessions::new(),
        }
    }

    pub fn settings(&self) -> &HomepageSettings {
        &self.settings
    }

    /// Today's date in the couple's home timezone.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.settings.timezone).date_naive()
    }

    // ------------------------------------------------------------------
    // Home
    // ------------------------------------------------------------------

    pub fn anniversary(&self) -> AnniversarySummary {
        self.anniversary.summary(self.today())
    }

    // ------------------------------------------------------------------
    // Expenses
    // ------------------------------------------------------------------

    pub async fn add_expense(
        &self,
        item: &str,
        amount: f64,
        payer: Participant,
    ) -> Result<LedgerEntry, HomepageError> {
        let item = item.trim();
        if item.is_empty() || !amount.is_finite() || amount <= 0.0 {
            return Err(HomepageError::Invalid(
                "請輸入項目和金額 (an item and an amount above zero).".to_string(),
            ));
        }

        let entry = LedgerEntry {
            date: self.today(),
            item: item.to_string(),
            amount,
            payer,
        };
        self.append_row(&entry).await?;
        Ok(entry)
    }

    pub async fn ledger(&self) -> Result<LedgerSummary, HomepageError> {
        let (entries, skipped) = self.read_rows_counted::<LedgerEntry>().await?;
        Ok(LedgerSummary {
            skipped,
            ..LedgerSummary::from_entries(entries)
        })
    }

    // ------------------------------------------------------------------
    // Wishlist
    // ------------------------------------------------------------------

    pub async fn add_wish(
        &self,
        item: &str,
        wisher: Participant,
        note: Option<&str>,
    ) -> Result<WishlistEntry, HomepageError> {
        let item = item.trim();
        if item.is_empty() {
            return Err(HomepageError::Invalid("What are we wishing for?".to_string()));
        }

        let entry = WishlistEntry {
            item: item.to_string(),
            wisher,
            note: note.map(str::trim).filter(|n| !n.is_empty()).map(String::from),
        };
        self.append_row(&entry).await?;
        Ok(entry)
    }

    pub async fn wishes(&self) -> Result<Vec<WishlistEntry>, HomepageError> {
        self.read_rows().await
    }

    // ------------------------------------------------------------------
    // Restaurants / meal picker
    // ------------------------------------------------------------------

    pub async fn add_restaurant(
        &self,
        name: &str,
        category: &str,
        price_tier: PriceTier,
    ) -> Result<RestaurantEntry, HomepageError> {
        let (name, category) = (name.trim(), category.trim());
        if name.is_empty() || category.is_empty() {
            return Err(HomepageError::Invalid(
                "A restaurant needs both a name and a category.".to_string(),
            ));
        }

        let entry = RestaurantEntry {
            name: name.to_string(),
            category: category.to_string(),
            price_tier,
        };
        self.append_row(&entry).await?;
        Ok(entry)
    }

    pub async fn restaurants(&self) -> Result<Vec<RestaurantEntry>, HomepageError> {
        self.read_rows().await
    }

    /// Picks a restaurant matching the given facets. `None` (or an empty
    /// list) for a facet means "anything goes".
    pub async fn pick_meal(
        &self,
        tiers: Option<Vec<PriceTier>>,
        categories: Option<Vec<String>>,
    ) -> Result<MealPick, HomepageError> {
        let restaurants = match self.restaurants().await {
            Ok(restaurants) => restaurants,
            Err(HomepageError::Table(err)) if err.is_not_found() => {
                tracing::info!("No Restaurants tab, falling back to quick picks");
                Vec::new()
            }
            Err(err) => return Err(err),
        };

        if restaurants.is_empty() {
            return Ok(MealPick::QuickPick(meals::quick_pick()));
        }

        let tiers = tiers
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| PriceTier::ALL.to_vec());
        let filter = match categories.filter(|c| !c.is_empty()) {
            Some(categories) => ChoiceFilter::new(tiers, categories),
            None => ChoiceFilter::new(tiers, restaurants.iter().map(|r| r.category.as_str())),
        };

        Ok(match meals::choose(&restaurants, &filter) {
            Some(restaurant) => MealPick::Restaurant(restaurant.clone()),
            None => MealPick::NoMatch,
        })
    }

    // ------------------------------------------------------------------
    // Photo wall
    // ------------------------------------------------------------------

    pub async fn add_photo_upload(
        &self,
        blob: Vec<u8>,
        filename: &str,
        caption: &str,
    ) -> Result<PhotoEntry, HomepageError> {
        let folder = self
            .settings
            .drive_folder_id
            .as_deref()
            .ok_or(HomepageError::UploadsDisabled)?;
        check_caption(caption)?;

        let url = self.files.upload(blob, filename, folder).await?;
        self.save_photo(caption, &url).await
    }

    pub async fn add_photo_link(
        &self,
        link: &str,
        caption: &str,
    ) -> Result<PhotoEntry, HomepageError> {
        let link = link.trim();
        if !link.starts_with("http://") && !link.starts_with("https://") {
            return Err(HomepageError::Invalid(
                "That doesn't look like a link. Paste the full http(s) URL.".to_string(),
            ));
        }
        check_caption(caption)?;
        self.save_photo(caption, link).await
    }

    /// Newest first.
    pub async fn photos(&self, limit: usize) -> Result<Vec<PhotoEntry>, HomepageError> {
        let photos = self.read_rows::<PhotoEntry>().await?;
        Ok(photos.into_iter().rev().take(limit).collect())
    }

    async fn save_photo(&self, caption: &str, url: &str) -> Result<PhotoEntry, HomepageError> {
        let entry = PhotoEntry {
            date: self.today(),
            caption: caption.trim().to_string(),
            url: links::normalize(url),
        };
        self.append_row(&entry).await?;
        Ok(entry)
    }

    // ------------------------------------------------------------------
    // Travel map
    // ------------------------------------------------------------------

    pub fn add_map_point(
        &self,
        session_id: u64,
        lat: f64,
        lon: f64,
    ) -> Result<(MapPoint, usize), HomepageError> {
        let point = MapPoint::new(lat, lon)?;
        let count = self.maps.add(session_id, point);
        Ok((point, count))
    }

    pub fn map_points(&self, session_id: u64) -> Vec<MapPoint> {
        self.maps.points(session_id)
    }

    pub fn reset_map(&self, session_id: u64) {
        self.maps.reset(session_id);
    }

    // ------------------------------------------------------------------
    // Remote table plumbing
    // ------------------------------------------------------------------

    async fn worksheet(&self, worksheet: Worksheet) -> Result<WorksheetHandle, TableError> {
        self.worksheets
            .get(&worksheet, move || async move {
                let name = &self.settings.spreadsheet;
                let sheet = self
                    .sheets
                    .get(name, move || self.tables.open_sheet(name))
                    .await?;
                tracing::debug!(spreadsheet = %sheet.name, %worksheet, "Opening worksheet");
                self.tables.open_worksheet(&sheet, worksheet.tab_name()).await
            })
            .await
    }

    async fn records(&self, worksheet: Worksheet) -> Result<Arc<Vec<Record>>, TableError> {
        let handle = self.worksheet(worksheet).await?;
        self.reads
            .get(&worksheet, move || async move {
                let rows = self.tables.read_all(&handle).await?;
                tracing::debug!(%worksheet, rows = rows.len(), "Fetched worksheet rows");
                Ok::<_, TableError>(Arc::new(rows))
            })
            .await
    }

    /// Typed rows in storage order. Rows that cannot be read are logged and skipped.
    async fn read_rows<R: SheetRow>(&self) -> Result<Vec<R>, HomepageError> {
        Ok(self.read_rows_counted().await?.0)
    }

    /// Like [`Self::read_rows`], also returning how many rows were skipped.
    async fn read_rows_counted<R: SheetRow>(&self) -> Result<(Vec<R>, usize), HomepageError> {
        let records = self.records(R::WORKSHEET).await?;

        let mut rows = Vec::with_capacity(records.len());
        let mut skipped = 0;
        for (index, record) in records.iter().enumerate() {
            match R::from_record(record) {
                Ok(row) => rows.push(row),
                Err(err) => {
                    skipped += 1;
                    tracing::warn!(
                        worksheet = %R::WORKSHEET,
                        // +2: one for the header row, one for 1-based numbering
                        row = index + 2,
                        error = %err,
                        "Skipping unreadable row"
                    );
                }
            }
        }
        Ok((rows, skipped))
    }

    async fn append_row<R: SheetRow>(&self, row: &R) -> Result<(), HomepageError> {
        let values = row.to_row();
        let handle = self.worksheet(R::WORKSHEET).await?;
        self.tables.append(&handle, values).await?;
        self.reads.invalidate_all().await;
        tracing::info!(worksheet = %R::WORKSHEET, "Appended row");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::credentials::CredentialResolver;
    use crate::infra::records::{InMemoryFileStore, InMemoryTableStore};
    use async_trait::async_trait;
    use serde_json::Value;

    const SHEET: &str = "OurLoveMoney";

    fn settings(folder: Option<&str>) -> HomepageSettings {
        HomepageSettings {
            spreadsheet: SHEET.to_string(),
            drive_folder_id: folder.map(String::from),
            anniversary_start: NaiveDate::from_ymd_opt(2025, 9, 17).unwrap(),
            timezone: chrono_tz::Asia::Taipei,
        }
    }

    fn full_store() -> InMemoryTableStore {
        InMemoryTableStore::new()
            .with_worksheet(SHEET, "工作表1", LedgerEntry::HEADERS)
            .with_worksheet(SHEET, "Photos", PhotoEntry::HEADERS)
            .with_worksheet(SHEET, "Wishlist", WishlistEntry::HEADERS)
            .with_worksheet(SHEET, "Restaurants", RestaurantEntry::HEADERS)
    }

    fn service(
        store: InMemoryTableStore,
        folder: Option<&str>,
    ) -> HomepageService<InMemoryTableStore, InMemoryFileStore> {
        HomepageService::new(store, InMemoryFileStore::new(), settings(folder))
    }

    #[tokio::test]
    async fn appended_expense_is_read_back_exactly_once() {
        let svc = service(full_store(), None);

        // Prime the read cache so the append has something to invalidate.
        assert!(svc.ledger().await.unwrap().entries.is_empty());

        let entry = svc
            .add_expense("火鍋", 880.0, Participant::Boyfriend)
            .await
            .unwrap();

        let ledger = svc.ledger().await.unwrap();
        assert_eq!(ledger.entries.iter().filter(|e| **e == entry).count(), 1);
        assert_eq!(ledger.total, 880.0);
    }

    #[tokio::test]
    async fn reads_are_cached_until_an_append() {
        let svc = service(full_store(), None);

        svc.ledger().await.unwrap();
        svc.ledger().await.unwrap();
        assert_eq!(svc.tables.read_count(), 1);

        svc.add_expense("movie", 500.0, Participant::Me).await.unwrap();
        svc.ledger().await.unwrap();
        assert_eq!(svc.tables.read_count(), 2);
    }

    #[tokio::test]
    async fn worksheet_handles_survive_invalidation() {
        let svc = service(full_store(), None);

        svc.ledger().await.unwrap();
        svc.add_expense("coffee", 120.0, Participant::Me).await.unwrap();
        svc.add_expense("bread", 60.0, Participant::Me).await.unwrap();
        svc.ledger().await.unwrap();

        assert_eq!(svc.tables.open_count(), 1);
    }

    #[tokio::test]
    async fn ledger_summary_splits_by_payer() {
        let svc = service(full_store(), None);
        svc.add_expense("sushi", 1000.0, Participant::Me).await.unwrap();
        svc.add_expense("taxi", 250.0, Participant::Boyfriend).await.unwrap();
        svc.add_expense("tea", 50.0, Participant::Me).await.unwrap();

        let ledger = svc.ledger().await.unwrap();
        assert_eq!(ledger.total, 1300.0);
        assert_eq!(
            ledger.by_payer,
            vec![(Participant::Me, 1050.0), (Participant::Boyfriend, 250.0)]
        );
        let recent: Vec<&str> = ledger.recent(2).map(|e| e.item.as_str()).collect();
        assert_eq!(recent, vec!["tea", "taxi"]);
    }

    #[tokio::test]
    async fn invalid_expense_is_rejected_before_touching_the_sheet() {
        let svc = service(full_store(), None);

        let attempts = [("", 100.0), ("lunch", 0.0), ("lunch", -3.0), ("lunch", f64::NAN)];
        for (item, amount) in attempts {
            let err = svc
                .add_expense(item, amount, Participant::Me)
                .await
                .unwrap_err();
            assert!(matches!(err, HomepageError::Invalid(_)));
        }
        assert_eq!(svc.tables.open_count(), 0);
    }

    #[tokio::test]
    async fn missing_tab_is_a_recoverable_not_found() {
        let store =
            InMemoryTableStore::new().with_worksheet(SHEET, "工作表1", LedgerEntry::HEADERS);
        let svc = service(store, None);

        let err = svc.wishes().await.unwrap_err();
        assert!(matches!(
            &err,
            HomepageError::Table(TableError::WorksheetNotFound(tab)) if tab == "Wishlist"
        ));
        assert!(err.user_message().contains("Create it"));
    }

    #[tokio::test]
    async fn missing_spreadsheet_is_reported_by_name() {
        let svc = service(InMemoryTableStore::new(), None);
        let err = svc.ledger().await.unwrap_err();
        assert!(err.user_message().contains(SHEET));
    }

    #[tokio::test]
    async fn meal_pick_falls_back_without_restaurants() {
        let store =
            InMemoryTableStore::new().with_worksheet(SHEET, "工作表1", LedgerEntry::HEADERS);
        let svc = service(store, None);

        match svc.pick_meal(None, None).await.unwrap() {
            MealPick::QuickPick(dish) => assert!(meals::QUICK_PICKS.contains(&dish)),
            other => panic!("expected a quick pick, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn meal_pick_honours_filters() {
        let svc = service(full_store(), None);
        let cheap = PriceTier::new(1).unwrap();
        let fancy = PriceTier::new(3).unwrap();
        svc.add_restaurant("Sushiro", "日式", cheap).await.unwrap();
        svc.add_restaurant("Wagyu House", "日式", fancy).await.unwrap();

        let pick = svc
            .pick_meal(Some(vec![cheap]), Some(vec!["日式".into()]))
            .await
            .unwrap();
        assert!(matches!(pick, MealPick::Restaurant(r) if r.name == "Sushiro"));

        let none = svc
            .pick_meal(Some(vec![cheap]), Some(vec!["台式".into()]))
            .await
            .unwrap();
        assert_eq!(none, MealPick::NoMatch);

        let any = svc.pick_meal(None, Some(vec![])).await.unwrap();
        assert!(matches!(any, MealPick::Restaurant(_)));
    }

    #[tokio::test]
    async fn textual_tiers_in_the_sheet_still_match() {
        let store = full_store();
        store.push_raw_row(
            SHEET,
            "Restaurants",
            vec![Value::from("Noodle Bar"), Value::from("麵"), Value::from("$")],
        );
        let svc = service(store, None);

        let pick = svc
            .pick_meal(Some(vec![PriceTier::new(1).unwrap()]), None)
            .await
            .unwrap();
        assert!(matches!(pick, MealPick::Restaurant(r) if r.name == "Noodle Bar"));
    }

    #[tokio::test]
    async fn photo_links_are_normalized_and_listed_newest_first() {
        let svc = service(full_store(), None);

        svc.add_photo_link("https://drive.google.com/file/d/FIRST/view", "beach")
            .await
            .unwrap();
        svc.add_photo_link("https://example.com/second.jpg", "dinner")
            .await
            .unwrap();

        let photos = svc.photos(10).await.unwrap();
        assert_eq!(photos.len(), 2);
        assert_eq!(photos[0].caption, "dinner");
        assert_eq!(
            photos[1].url,
            "https://drive.google.com/uc?export=view&id=FIRST"
        );
        assert_eq!(svc.photos(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn photo_uploads_land_on_the_wall() {
        let svc = service(full_store(), Some("folder-1"));

        let photo = svc
            .add_photo_upload(vec![1, 2, 3], "us.jpg", "first trip")
            .await
            .unwrap();

        assert!(photo.url.starts_with("https://drive.google.com/uc?export=view&id="));
        assert_eq!(svc.files.stored_in("folder-1"), 1);
        assert_eq!(svc.photos(5).await.unwrap(), vec![photo]);
    }

    #[tokio::test]
    async fn overlong_captions_are_rejected_before_saving() {
        let svc = service(full_store(), Some("folder-1"));
        let caption = "好".repeat(MAX_CAPTION_CHARS + 1);

        let err = svc
            .add_photo_link("https://example.com/a.jpg", &caption)
            .await
            .unwrap_err();
        assert!(matches!(err, HomepageError::Invalid(_)));

        let err = svc
            .add_photo_upload(vec![1], "a.jpg", &caption)
            .await
            .unwrap_err();
        assert!(matches!(err, HomepageError::Invalid(_)));

        assert_eq!(svc.files.stored_in("folder-1"), 0);
        assert!(svc.photos(10).await.unwrap().is_empty());

        let longest = "x".repeat(MAX_CAPTION_CHARS);
        svc.add_photo_link("https://example.com/a.jpg", &longest)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn unshared_upload_is_reported_and_not_saved() {
        let svc = HomepageService::new(
            full_store(),
            InMemoryFileStore::new().failing_share(),
            settings(Some("folder-1")),
        );

        let err = svc
            .add_photo_upload(vec![1, 2], "us.jpg", "dinner")
            .await
            .unwrap_err();

        assert!(matches!(err, HomepageError::Upload(UploadError::Share { .. })));
        let message = err.user_message();
        assert!(message.contains("mem1"));
        assert!(message.contains("couldn't be shared"));

        // The blob is stranded in Drive, but the wall stays clean.
        assert_eq!(svc.files.stored_in("folder-1"), 1);
        assert!(svc.photos(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unreadable_ledger_rows_are_counted() {
        let store = full_store();
        store.push_raw_row(
            SHEET,
            "工作表1",
            vec![
                Value::from("2025-10-01"),
                Value::from("gift"),
                Value::from(300),
                Value::from("someone else"),
            ],
        );
        let svc = service(store, None);
        svc.add_expense("tea", 50.0, Participant::Me).await.unwrap();

        let ledger = svc.ledger().await.unwrap();
        assert_eq!(ledger.skipped, 1);
        assert_eq!(ledger.total, 50.0);
    }

    #[tokio::test]
    async fn uploads_need_a_folder() {
        let svc = service(full_store(), None);
        let err = svc
            .add_photo_upload(vec![1], "a.png", "x")
            .await
            .unwrap_err();
        assert!(matches!(err, HomepageError::UploadsDisabled));
    }

    #[tokio::test]
    async fn non_links_are_rejected() {
        let svc = service(full_store(), None);
        let err = svc.add_photo_link("just words", "x").await.unwrap_err();
        assert!(matches!(err, HomepageError::Invalid(_)));
    }

    #[tokio::test]
    async fn wishes_keep_their_optional_note() {
        let svc = service(full_store(), None);
        svc.add_wish("tent", Participant::Boyfriend, Some("  for camping "))
            .await
            .unwrap();
        svc.add_wish("switch", Participant::Me, Some("  ")).await.unwrap();

        let wishes = svc.wishes().await.unwrap();
        assert_eq!(wishes[0].note.as_deref(), Some("for camping"));
        assert_eq!(wishes[1].note, None);
    }

    #[tokio::test]
    async fn map_points_are_validated_and_per_session() {
        let svc = service(full_store(), None);

        let (_, count) = svc.add_map_point(7, 35.0, 139.0).unwrap();
        assert_eq!(count, 3);
        assert!(matches!(
            svc.add_map_point(7, 100.0, 0.0),
            Err(HomepageError::Map(MapError::InvalidLatitude(_)))
        ));
        assert_eq!(svc.map_points(8).len(), 2);

        svc.reset_map(7);
        assert_eq!(svc.map_points(7).len(), 2);
    }

    struct LockedOutStore;

    #[async_trait]
    impl TableStore for LockedOutStore {
        async fn open_sheet(&self, _: &str) -> Result<SheetHandle, TableError> {
            let resolver = CredentialResolver::new(vec![]);
            Err(resolver.resolve().await.unwrap_err().into())
        }

        async fn open_worksheet(
            &self,
            _: &SheetHandle,
            _: Option<&str>,
        ) -> Result<WorksheetHandle, TableError> {
            unreachable!("sheet never opens")
        }

        async fn read_all(&self, _: &WorksheetHandle) -> Result<Vec<Record>, TableError> {
            unreachable!("sheet never opens")
        }

        async fn append(&self, _: &WorksheetHandle, _: Vec<Value>) -> Result<(), TableError> {
            unreachable!("sheet never opens")
        }
    }

    #[tokio::test]
    async fn missing_credentials_become_a_friendly_message() {
        let svc = HomepageService::new(LockedOutStore, InMemoryFileStore::new(), settings(None));
        let err = svc.ledger().await.unwrap_err();
        assert!(err.user_message().contains("Can't find the keys"));
    }
}
