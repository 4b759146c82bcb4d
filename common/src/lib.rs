//! Invoice Extract Common Library
//!
//! CLIから使われるUI非依存のコア:
//! 取り込み・フィールド選択・結果表示モデル・セッション（ディスパッチャ）

pub mod error;
pub mod fields;
pub mod intake;
pub mod preview;
pub mod results;
pub mod session;
pub mod types;

pub use error::{Error, Result};
pub use fields::{field_label, FieldSelector, FIELD_CATALOG, LINE_ITEMS_FIELD, LINE_ITEM_OPTIONS};
pub use intake::{format_total_size, FileSet, IntakeMode, IntakeOutcome};
pub use preview::{Modal, PreviewEntry, PreviewOutcome, PreviewStatus, PreviewTarget};
pub use results::{parse_results, CardBody, Download, ResultCard, ResultsView, Tab};
pub use session::{Action, Effect, Session, SubmissionRequest};
pub use types::{ExtractionResult, FileKind, Notification, NotificationKind, UploadedFile};
