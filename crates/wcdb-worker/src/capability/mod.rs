//! Interface consumed from the database capability implementation.
//!
//! The worker treats the decryption and query engine as an opaque capability.
//! Three collaborators are involved:
//!
//! - a [`ModuleLoader`] that pays the cost of loading the implementation (for
//!   example a native library) and yields a [`CapabilityModule`];
//! - the [`CapabilityModule`], which constructs instances and remembers the
//!   last initialisation failure;
//! - the [`Capability`] instance, which exposes one method per instance-bound
//!   selector.
//!
//! Domain methods default to [`CapabilityError::Unsupported`], so an
//! implementation only overrides what it provides.

mod args;
mod error;

use std::sync::Arc;

use serde_json::Value;

pub use self::args::{
    AnnualReportExtrasQuery, ChatroomRef, ChatroomRefs, ConnectArgs, ContactRef, CursorOptions,
    CursorRef, EmoticonRef, GroupStatsQuery, MessageMetaQuery, MessageRef, NewMessagesQuery,
    QueryArgs, SessionPage, SessionRange, SessionRef, SessionSet, SnsTimelineQuery, TimeRange,
    Usernames, VerifyArgs, VoiceQuery,
};
pub use self::error::CapabilityError;

use crate::settings::WorkerSettings;

/// Result of a domain operation.
pub type CapabilityResult = Result<Value, CapabilityError>;

/// Callback invoked by the instance to raise a monitor event.
///
/// Arguments are the event kind and the serialised event data.
pub type MonitorCallback = Arc<dyn Fn(&str, &str) + Send + Sync>;

/// Loads the capability implementation module.
///
/// Called at most once per successful load; failures are retried on the next
/// demand.
pub trait ModuleLoader: Send + Sync {
    /// Loads the implementation.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::Load`] when the implementation cannot be
    /// made available.
    fn load(&self) -> Result<Arc<dyn CapabilityModule>, CapabilityError>;
}

/// A loaded capability implementation.
pub trait CapabilityModule: Send + Sync {
    /// Builds a new instance using the settings received so far.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::Construct`] when the instance cannot be
    /// built.
    fn construct(&self, settings: &WorkerSettings) -> Result<Arc<dyn Capability>, CapabilityError>;

    /// Most recent structured initialisation failure, if any.
    fn last_init_error(&self) -> Option<String>;
}

fn unsupported(operation: &str) -> CapabilityResult {
    Err(CapabilityError::unsupported(operation))
}

/// A constructed capability instance.
pub trait Capability: Send + Sync {
    /// Initialises the underlying engine.
    ///
    /// Returns `Ok(false)` when initialisation failed in a way the module
    /// reports through [`CapabilityModule::last_init_error`].
    ///
    /// # Errors
    ///
    /// Returns an error when initialisation could not be attempted.
    fn initialize(&self) -> Result<bool, CapabilityError>;

    /// Releases every resource held by the instance.
    fn shutdown(&self);

    /// Installs the monitor callback, replacing any previous one.
    fn set_monitor(&self, callback: MonitorCallback);

    /// Opens and immediately closes a database to validate the key.
    fn test_connection(&self, _args: &ConnectArgs) -> CapabilityResult {
        unsupported("testConnection")
    }

    /// Opens the account databases.
    fn open(&self, _args: &ConnectArgs) -> CapabilityResult {
        unsupported("open")
    }

    /// Closes the account databases.
    fn close(&self) -> CapabilityResult {
        unsupported("close")
    }

    /// Reports whether the account databases are open.
    fn is_connected(&self) -> CapabilityResult {
        unsupported("isConnected")
    }

    /// Lists sessions.
    fn get_sessions(&self) -> CapabilityResult {
        unsupported("getSessions")
    }

    /// Reads a page of messages.
    fn get_messages(&self, _args: &SessionPage) -> CapabilityResult {
        unsupported("getMessages")
    }

    /// Reads messages newer than a timestamp.
    fn get_new_messages(&self, _args: &NewMessagesQuery) -> CapabilityResult {
        unsupported("getNewMessages")
    }

    /// Counts messages in a session.
    fn get_message_count(&self, _args: &SessionRef) -> CapabilityResult {
        unsupported("getMessageCount")
    }

    /// Resolves display names.
    fn get_display_names(&self, _args: &Usernames) -> CapabilityResult {
        unsupported("getDisplayNames")
    }

    /// Resolves avatar URLs.
    fn get_avatar_urls(&self, _args: &Usernames) -> CapabilityResult {
        unsupported("getAvatarUrls")
    }

    /// Counts members of a group chat.
    fn get_group_member_count(&self, _args: &ChatroomRef) -> CapabilityResult {
        unsupported("getGroupMemberCount")
    }

    /// Counts members of several group chats.
    fn get_group_member_counts(&self, _args: &ChatroomRefs) -> CapabilityResult {
        unsupported("getGroupMemberCounts")
    }

    /// Lists members of a group chat.
    fn get_group_members(&self, _args: &ChatroomRef) -> CapabilityResult {
        unsupported("getGroupMembers")
    }

    /// Lists group-specific nicknames.
    fn get_group_nicknames(&self, _args: &ChatroomRef) -> CapabilityResult {
        unsupported("getGroupNicknames")
    }

    /// Lists the tables holding a session's messages.
    fn get_message_tables(&self, _args: &SessionRef) -> CapabilityResult {
        unsupported("getMessageTables")
    }

    /// Row statistics for a session's message tables.
    fn get_message_table_stats(&self, _args: &SessionRef) -> CapabilityResult {
        unsupported("getMessageTableStats")
    }

    /// Raw message metadata from one table.
    fn get_message_meta(&self, _args: &MessageMetaQuery) -> CapabilityResult {
        unsupported("getMessageMeta")
    }

    /// Reads a contact record.
    fn get_contact(&self, _args: &ContactRef) -> CapabilityResult {
        unsupported("getContact")
    }

    /// Aggregated statistics across sessions.
    fn get_aggregate_stats(&self, _args: &SessionRange) -> CapabilityResult {
        unsupported("getAggregateStats")
    }

    /// Years that contain messages.
    fn get_available_years(&self, _args: &SessionSet) -> CapabilityResult {
        unsupported("getAvailableYears")
    }

    /// Annual report statistics.
    fn get_annual_report_stats(&self, _args: &SessionRange) -> CapabilityResult {
        unsupported("getAnnualReportStats")
    }

    /// Annual report extras.
    fn get_annual_report_extras(&self, _args: &AnnualReportExtrasQuery) -> CapabilityResult {
        unsupported("getAnnualReportExtras")
    }

    /// Group chat statistics.
    fn get_group_stats(&self, _args: &GroupStatsQuery) -> CapabilityResult {
        unsupported("getGroupStats")
    }

    /// Opens a streaming cursor returning full messages.
    fn open_message_cursor(&self, _args: &CursorOptions) -> CapabilityResult {
        unsupported("openMessageCursor")
    }

    /// Opens a streaming cursor returning abbreviated messages.
    fn open_message_cursor_lite(&self, _args: &CursorOptions) -> CapabilityResult {
        unsupported("openMessageCursorLite")
    }

    /// Fetches the next batch from a cursor.
    fn fetch_message_batch(&self, _args: &CursorRef) -> CapabilityResult {
        unsupported("fetchMessageBatch")
    }

    /// Closes a cursor.
    fn close_message_cursor(&self, _args: &CursorRef) -> CapabilityResult {
        unsupported("closeMessageCursor")
    }

    /// Executes ad-hoc SQL.
    fn exec_query(&self, _args: &QueryArgs) -> CapabilityResult {
        unsupported("execQuery")
    }

    /// Resolves an emoticon's CDN URL.
    fn get_emoticon_cdn_url(&self, _args: &EmoticonRef) -> CapabilityResult {
        unsupported("getEmoticonCdnUrl")
    }

    /// Lists message database files.
    fn list_message_dbs(&self) -> CapabilityResult {
        unsupported("listMessageDbs")
    }

    /// Lists media database files.
    fn list_media_dbs(&self) -> CapabilityResult {
        unsupported("listMediaDbs")
    }

    /// Reads a single message.
    fn get_message_by_id(&self, _args: &MessageRef) -> CapabilityResult {
        unsupported("getMessageById")
    }

    /// Extracts a voice clip.
    fn get_voice_data(&self, _args: &VoiceQuery) -> CapabilityResult {
        unsupported("getVoiceData")
    }

    /// Reads the moments timeline.
    fn get_sns_timeline(&self, _args: &SnsTimelineQuery) -> CapabilityResult {
        unsupported("getSnsTimeline")
    }

    /// Moments statistics for a year.
    fn get_sns_annual_stats(&self, _args: &TimeRange) -> CapabilityResult {
        unsupported("getSnsAnnualStats")
    }

    /// Returns the engine's own log buffer.
    fn get_logs(&self) -> CapabilityResult {
        unsupported("getLogs")
    }

    /// Asks the user to confirm their identity.
    fn verify_user(&self, _args: &VerifyArgs) -> CapabilityResult {
        unsupported("verifyUser")
    }
}
