//! Closed table of instance-bound operations.
//!
//! Every selector that needs the capability instance maps to one
//! [`Operation`] variant carrying its decoded arguments. Payloads are
//! validated when the operation is decoded, before the instance method runs.

use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::warn;

use crate::capability::{
    AnnualReportExtrasQuery, Capability, CapabilityResult, ChatroomRef, ChatroomRefs, ConnectArgs,
    ContactRef, CursorOptions, CursorRef, EmoticonRef, GroupStatsQuery, MessageMetaQuery,
    MessageRef, NewMessagesQuery, QueryArgs, SessionPage, SessionRange, SessionRef, SessionSet,
    SnsTimelineQuery, TimeRange, Usernames, VerifyArgs, VoiceQuery,
};
use crate::dispatch::DispatchError;
use crate::monitor::MonitorRelay;

const OPERATIONS_TARGET: &str = concat!(env!("CARGO_CRATE_NAME"), "::operations");

/// A decoded instance-bound operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// `testConnection`
    TestConnection(ConnectArgs),
    /// `open`
    Open(ConnectArgs),
    /// `close`
    Close,
    /// `isConnected`
    IsConnected,
    /// `getSessions`
    GetSessions,
    /// `getMessages`
    GetMessages(SessionPage),
    /// `getNewMessages`
    GetNewMessages(NewMessagesQuery),
    /// `getMessageCount`
    GetMessageCount(SessionRef),
    /// `getDisplayNames`
    GetDisplayNames(Usernames),
    /// `getAvatarUrls`
    GetAvatarUrls(Usernames),
    /// `getGroupMemberCount`
    GetGroupMemberCount(ChatroomRef),
    /// `getGroupMemberCounts`
    GetGroupMemberCounts(ChatroomRefs),
    /// `getGroupMembers`
    GetGroupMembers(ChatroomRef),
    /// `getGroupNicknames`
    GetGroupNicknames(ChatroomRef),
    /// `getMessageTables`
    GetMessageTables(SessionRef),
    /// `getMessageTableStats`
    GetMessageTableStats(SessionRef),
    /// `getMessageMeta`
    GetMessageMeta(MessageMetaQuery),
    /// `getContact`
    GetContact(ContactRef),
    /// `getAggregateStats`
    GetAggregateStats(SessionRange),
    /// `getAvailableYears`
    GetAvailableYears(SessionSet),
    /// `getAnnualReportStats`
    GetAnnualReportStats(SessionRange),
    /// `getAnnualReportExtras`
    GetAnnualReportExtras(AnnualReportExtrasQuery),
    /// `getGroupStats`
    GetGroupStats(GroupStatsQuery),
    /// `openMessageCursor`
    OpenMessageCursor(CursorOptions),
    /// `openMessageCursorLite`
    OpenMessageCursorLite(CursorOptions),
    /// `fetchMessageBatch`
    FetchMessageBatch(CursorRef),
    /// `closeMessageCursor`
    CloseMessageCursor(CursorRef),
    /// `execQuery`
    ExecQuery(QueryArgs),
    /// `getEmoticonCdnUrl`
    GetEmoticonCdnUrl(EmoticonRef),
    /// `listMessageDbs`
    ListMessageDbs,
    /// `listMediaDbs`
    ListMediaDbs,
    /// `getMessageById`
    GetMessageById(MessageRef),
    /// `getVoiceData`
    GetVoiceData(VoiceQuery),
    /// `getSnsTimeline`
    GetSnsTimeline(SnsTimelineQuery),
    /// `getSnsAnnualStats`
    GetSnsAnnualStats(TimeRange),
    /// `getLogs`
    GetLogs,
    /// `verifyUser`
    VerifyUser(VerifyArgs),
    /// Registers the monitor relay as the instance's event callback.
    SetMonitor,
}

impl Operation {
    /// Every selector in the table.
    pub const SELECTORS: &'static [&'static str] = &[
        "testConnection",
        "open",
        "close",
        "isConnected",
        "getSessions",
        "getMessages",
        "getNewMessages",
        "getMessageCount",
        "getDisplayNames",
        "getAvatarUrls",
        "getGroupMemberCount",
        "getGroupMemberCounts",
        "getGroupMembers",
        "getGroupNicknames",
        "getMessageTables",
        "getMessageTableStats",
        "getMessageMeta",
        "getContact",
        "getAggregateStats",
        "getAvailableYears",
        "getAnnualReportStats",
        "getAnnualReportExtras",
        "getGroupStats",
        "openMessageCursor",
        "openMessageCursorLite",
        "fetchMessageBatch",
        "closeMessageCursor",
        "execQuery",
        "getEmoticonCdnUrl",
        "listMessageDbs",
        "listMediaDbs",
        "getMessageById",
        "getVoiceData",
        "getSnsTimeline",
        "getSnsAnnualStats",
        "getLogs",
        "verifyUser",
        "setMonitor",
    ];

    /// Looks `selector` up and decodes its arguments from `payload`.
    ///
    /// Returns `Ok(None)` for selectors outside the table.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidArguments`] when the payload does not
    /// match the operation's arguments.
    pub fn decode(selector: &str, payload: Value) -> Result<Option<Self>, DispatchError> {
        let args = Arguments { selector, payload };
        let operation = match selector {
            "testConnection" => Self::TestConnection(args.decode()?),
            "open" => Self::Open(args.decode()?),
            "close" => Self::Close,
            "isConnected" => Self::IsConnected,
            "getSessions" => Self::GetSessions,
            "getMessages" => Self::GetMessages(args.decode()?),
            "getNewMessages" => Self::GetNewMessages(args.decode()?),
            "getMessageCount" => Self::GetMessageCount(args.decode()?),
            "getDisplayNames" => Self::GetDisplayNames(args.decode()?),
            "getAvatarUrls" => Self::GetAvatarUrls(args.decode()?),
            "getGroupMemberCount" => Self::GetGroupMemberCount(args.decode()?),
            "getGroupMemberCounts" => Self::GetGroupMemberCounts(args.decode()?),
            "getGroupMembers" => Self::GetGroupMembers(args.decode()?),
            "getGroupNicknames" => Self::GetGroupNicknames(args.decode()?),
            "getMessageTables" => Self::GetMessageTables(args.decode()?),
            "getMessageTableStats" => Self::GetMessageTableStats(args.decode()?),
            "getMessageMeta" => Self::GetMessageMeta(args.decode()?),
            "getContact" => Self::GetContact(args.decode()?),
            "getAggregateStats" => Self::GetAggregateStats(args.decode()?),
            "getAvailableYears" => Self::GetAvailableYears(args.decode()?),
            "getAnnualReportStats" => Self::GetAnnualReportStats(args.decode()?),
            "getAnnualReportExtras" => Self::GetAnnualReportExtras(args.decode()?),
            "getGroupStats" => Self::GetGroupStats(args.decode()?),
            "openMessageCursor" => Self::OpenMessageCursor(args.decode()?),
            "openMessageCursorLite" => Self::OpenMessageCursorLite(args.decode()?),
            "fetchMessageBatch" => Self::FetchMessageBatch(args.decode()?),
            "closeMessageCursor" => Self::CloseMessageCursor(args.decode()?),
            "execQuery" => Self::ExecQuery(args.decode()?),
            "getEmoticonCdnUrl" => Self::GetEmoticonCdnUrl(args.decode()?),
            "listMessageDbs" => Self::ListMessageDbs,
            "listMediaDbs" => Self::ListMediaDbs,
            "getMessageById" => Self::GetMessageById(args.decode()?),
            "getVoiceData" => Self::GetVoiceData(args.decode()?),
            "getSnsTimeline" => Self::GetSnsTimeline(args.decode()?),
            "getSnsAnnualStats" => Self::GetSnsAnnualStats(args.decode()?),
            "getLogs" => Self::GetLogs,
            "verifyUser" => Self::VerifyUser(args.decode()?),
            "setMonitor" => Self::SetMonitor,
            _ => return Ok(None),
        };
        Ok(Some(operation))
    }

    /// Returns the wire selector of the operation.
    #[must_use]
    pub const fn selector(&self) -> &'static str {
        match self {
            Self::TestConnection(_) => "testConnection",
            Self::Open(_) => "open",
            Self::Close => "close",
            Self::IsConnected => "isConnected",
            Self::GetSessions => "getSessions",
            Self::GetMessages(_) => "getMessages",
            Self::GetNewMessages(_) => "getNewMessages",
            Self::GetMessageCount(_) => "getMessageCount",
            Self::GetDisplayNames(_) => "getDisplayNames",
            Self::GetAvatarUrls(_) => "getAvatarUrls",
            Self::GetGroupMemberCount(_) => "getGroupMemberCount",
            Self::GetGroupMemberCounts(_) => "getGroupMemberCounts",
            Self::GetGroupMembers(_) => "getGroupMembers",
            Self::GetGroupNicknames(_) => "getGroupNicknames",
            Self::GetMessageTables(_) => "getMessageTables",
            Self::GetMessageTableStats(_) => "getMessageTableStats",
            Self::GetMessageMeta(_) => "getMessageMeta",
            Self::GetContact(_) => "getContact",
            Self::GetAggregateStats(_) => "getAggregateStats",
            Self::GetAvailableYears(_) => "getAvailableYears",
            Self::GetAnnualReportStats(_) => "getAnnualReportStats",
            Self::GetAnnualReportExtras(_) => "getAnnualReportExtras",
            Self::GetGroupStats(_) => "getGroupStats",
            Self::OpenMessageCursor(_) => "openMessageCursor",
            Self::OpenMessageCursorLite(_) => "openMessageCursorLite",
            Self::FetchMessageBatch(_) => "fetchMessageBatch",
            Self::CloseMessageCursor(_) => "closeMessageCursor",
            Self::ExecQuery(_) => "execQuery",
            Self::GetEmoticonCdnUrl(_) => "getEmoticonCdnUrl",
            Self::ListMessageDbs => "listMessageDbs",
            Self::ListMediaDbs => "listMediaDbs",
            Self::GetMessageById(_) => "getMessageById",
            Self::GetVoiceData(_) => "getVoiceData",
            Self::GetSnsTimeline(_) => "getSnsTimeline",
            Self::GetSnsAnnualStats(_) => "getSnsAnnualStats",
            Self::GetLogs => "getLogs",
            Self::VerifyUser(_) => "verifyUser",
            Self::SetMonitor => "setMonitor",
        }
    }

    /// Runs the operation against `capability`.
    ///
    /// # Errors
    ///
    /// Propagates the capability's error.
    pub fn invoke(&self, capability: &dyn Capability, relay: &MonitorRelay) -> CapabilityResult {
        match self {
            Self::TestConnection(args) => capability.test_connection(args),
            Self::Open(args) => capability.open(args),
            Self::Close => {
                capability.close()?;
                Ok(json!({"success": true}))
            }
            Self::IsConnected => capability.is_connected(),
            Self::GetSessions => capability.get_sessions(),
            Self::GetMessages(args) => capability.get_messages(args),
            Self::GetNewMessages(args) => capability.get_new_messages(args),
            Self::GetMessageCount(args) => capability.get_message_count(args),
            Self::GetDisplayNames(args) => capability.get_display_names(args),
            Self::GetAvatarUrls(args) => capability.get_avatar_urls(args),
            Self::GetGroupMemberCount(args) => capability.get_group_member_count(args),
            Self::GetGroupMemberCounts(args) => capability.get_group_member_counts(args),
            Self::GetGroupMembers(args) => capability.get_group_members(args),
            Self::GetGroupNicknames(args) => capability.get_group_nicknames(args),
            Self::GetMessageTables(args) => capability.get_message_tables(args),
            Self::GetMessageTableStats(args) => capability.get_message_table_stats(args),
            Self::GetMessageMeta(args) => capability.get_message_meta(args),
            Self::GetContact(args) => capability.get_contact(args),
            Self::GetAggregateStats(args) => capability.get_aggregate_stats(args),
            Self::GetAvailableYears(args) => capability.get_available_years(args),
            Self::GetAnnualReportStats(args) => capability.get_annual_report_stats(args),
            Self::GetAnnualReportExtras(args) => capability.get_annual_report_extras(args),
            Self::GetGroupStats(args) => capability.get_group_stats(args),
            Self::OpenMessageCursor(args) => capability.open_message_cursor(args),
            Self::OpenMessageCursorLite(args) => capability.open_message_cursor_lite(args),
            Self::FetchMessageBatch(args) => capability.fetch_message_batch(args),
            Self::CloseMessageCursor(args) => capability.close_message_cursor(args),
            Self::ExecQuery(args) => capability.exec_query(args),
            Self::GetEmoticonCdnUrl(args) => capability.get_emoticon_cdn_url(args),
            Self::ListMessageDbs => capability.list_message_dbs(),
            Self::ListMediaDbs => capability.list_media_dbs(),
            Self::GetMessageById(args) => capability.get_message_by_id(args),
            Self::GetVoiceData(args) => {
                let result = capability.get_voice_data(args)?;
                warn_on_voice_failure(args, &result);
                Ok(result)
            }
            Self::GetSnsTimeline(args) => capability.get_sns_timeline(args),
            Self::GetSnsAnnualStats(args) => capability.get_sns_annual_stats(args),
            Self::GetLogs => capability.get_logs(),
            Self::VerifyUser(args) => capability.verify_user(args),
            Self::SetMonitor => {
                capability.set_monitor(relay.callback());
                Ok(json!({"success": true}))
            }
        }
    }
}

struct Arguments<'a> {
    selector: &'a str,
    payload: Value,
}

impl Arguments<'_> {
    fn decode<T: DeserializeOwned>(self) -> Result<T, DispatchError> {
        serde_json::from_value(self.payload)
            .map_err(|source| DispatchError::invalid_arguments(self.selector, source))
    }
}

fn warn_on_voice_failure(query: &VoiceQuery, result: &Value) {
    if result.get("success").and_then(Value::as_bool) != Some(false) {
        return;
    }
    let error = result
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("unknown error");
    warn!(
        target: OPERATIONS_TARGET,
        session_id = %query.session_id,
        create_time = query.create_time,
        local_id = ?query.local_id,
        candidates = query.candidates.len(),
        error,
        "voice data lookup failed"
    );
}
