/// Logical table names, shared by both source formats.
/// These are also the CSV file stems of the spreadsheet export.
pub const PERSONS_TABLE: &str = "persons";
pub const MINISTRIES_TABLE: &str = "ministries";
pub const PERSON_MINISTRIES_TABLE: &str = "person_ministries";
pub const CAREERS_TABLE: &str = "person_careers";
pub const COLLABORATORS_TABLE: &str = "collaborators";
pub const DELEGATES_TABLE: &str = "delegates";

// Workbook sheet names
pub const MINISTERS_SHEET: &str = "Ministers";
pub const MINISTRIES_SHEET: &str = "Ministries";
pub const BIOGRAPHY_SHEET: &str = "Biography";
pub const COLLABORATORS_SHEET: &str = "Collaborators";
pub const DELEGATES_SHEET: &str = "Delegates";

/// Column aliases. The first alias present on a row wins, so the
/// spreadsheet-era camelCase names come first.
pub mod columns {
    pub const ID: &[&str] = &["id"];
    pub const NAME: &[&str] = &["name", "full_name"];
    pub const FULL_NAME: &[&str] = &["full_name", "name"];
    pub const ROLE: &[&str] = &["role"];
    pub const EMAIL: &[&str] = &["email"];
    pub const PARTY: &[&str] = &["party"];
    pub const PHOTO: &[&str] = &["photo", "photo_url"];
    pub const PHOTO_URL: &[&str] = &["photo_url", "photo"];
    pub const PORTFOLIO: &[&str] = &["portfolio"];
    pub const DESCRIPTION: &[&str] = &["description"];
    pub const SUPERIOR_ID: &[&str] = &["superiorId", "superior_id"];

    pub const SHORT_NAME: &[&str] = &["shortName", "short_name"];
    pub const COLOR: &[&str] = &["color"];
    pub const IS_PRIMARY: &[&str] = &["isPrimary", "is_primary"];
    pub const ROLE_LABEL: &[&str] = &["roleLabel", "role_label"];

    pub const MINISTER_ID: &[&str] = &["ministerId", "person_id"];
    pub const PERSON_ID: &[&str] = &["person_id", "ministerId"];
    pub const MINISTRY_ID: &[&str] = &["ministry_id", "ministryId"];
    pub const DELEGATE_ID: &[&str] = &["delegateId", "delegate_id"];

    pub const TITLE: &[&str] = &["title"];
    pub const ORGANIZATION: &[&str] = &["organization", "organisation"];
    pub const BIO_SECTION: &[&str] = &["bioSection", "bio_section"];
    pub const START_DATE: &[&str] = &["startDate", "start_date"];
    pub const END_DATE: &[&str] = &["endDate", "end_date"];
    pub const EVENT_DATE: &[&str] = &["eventDate", "event_date"];
    pub const EVENT_TEXT: &[&str] = &["eventText", "event_text"];
    pub const ONGOING: &[&str] = &["ongoing"];
    pub const SORT_INDEX: &[&str] = &["sortIndex", "sort_index"];

    pub const JOB_TITLE: &[&str] = &["job_title", "jobTitle"];
    pub const CABINET_ROLE: &[&str] = &["cabinet_role", "cabinetRole"];
    pub const CABINET_ORDER: &[&str] = &["cabinet_order", "cabinetOrder"];
    pub const CABINET_BADGE: &[&str] = &["cabinet_badge", "cabinetBadge"];
    pub const COLLAB_GRADE: &[&str] = &["collab_grade", "collabGrade"];
    pub const POLE_NAME: &[&str] = &["pole_name", "poleName"];
}

/// Role tags that collapse to the single output role "minister"
pub const MINISTER_ROLE_TAGS: &[&str] = &[
    "minister",
    "minister-delegate",
    "ministre-delegue",
    "minister-state",
    "president",
    "leader",
    "secretary",
];

pub const COLLABORATOR_ROLE_TAG: &str = "collaborator";

/// The only role value ever emitted on a Minister record
pub const OUTPUT_MINISTER_ROLE: &str = "minister";

pub const DEFAULT_OUTPUT_PATH: &str = "data/ministers.json";
pub const DEFAULT_CONFIG_PATH: &str = "cabinet.toml";
pub const SPLIT_INDEX_FILE: &str = "index.json";
