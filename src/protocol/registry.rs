//! The compile-time `(Direction, type tag)` → decode/dispatch table (§4.4).
//!
//! Client-to-server and server-to-client tags are independent namespaces on
//! this wire, so the table is split per direction rather than kept as one
//! flat enum.
//!
//! `Error` and `Notice` are deliberately absent from [`Message`]: the engine
//! decodes and dispatches them itself, before ever consulting this table
//! (§4.3, I4/I5).

use super::codec::MessageDecode;
use super::error::{ProtocolError, Result};
use super::message::{
    AuthenticateContinue, AuthenticateOk, AuthenticateStart, CapabilitiesGet, CapabilitiesResponse,
    CapabilitiesSet, ColumnMetaData, ConnectionClose, Delete, ExpectClose, ExpectOpen, FetchDone,
    FetchDoneMoreResultsets, Find, Insert, OkMessage, Row, SessionClose, SessionReset, StmtExecute,
    StmtExecuteOk, Update,
};
use super::processor::Processor;
use super::tag::{ClientTag, Direction, ServerTag};

const SERVER_TAGS: &[u8] = &[
    ServerTag::Ok as u8,
    ServerTag::CapabilitiesResponse as u8,
    ServerTag::SessAuthenticateContinue as u8,
    ServerTag::SessAuthenticateOk as u8,
    ServerTag::ResultsetColumnMetaData as u8,
    ServerTag::ResultsetRow as u8,
    ServerTag::ResultsetFetchDone as u8,
    ServerTag::ResultsetFetchDoneMoreResultsets as u8,
    ServerTag::SqlStmtExecuteOk as u8,
];

const CLIENT_TAGS: &[u8] = &[
    ClientTag::ConCapabilitiesGet as u8,
    ClientTag::ConCapabilitiesSet as u8,
    ClientTag::SessAuthenticateStart as u8,
    ClientTag::SessAuthenticateContinue as u8,
    ClientTag::ConClose as u8,
    ClientTag::SessReset as u8,
    ClientTag::SessClose as u8,
    ClientTag::SqlStmtExecute as u8,
    ClientTag::CrudFind as u8,
    ClientTag::CrudInsert as u8,
    ClientTag::CrudUpdate as u8,
    ClientTag::CrudDelete as u8,
    ClientTag::ExpectOpen as u8,
    ClientTag::ExpectClose as u8,
];

/// A decoded, registry-routed message. Excludes `Error`/`Notice` (see module docs).
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// `Ok`.
    Ok(OkMessage),
    /// Response to `Connection.CapabilitiesGet`/`CapabilitiesSet`.
    CapabilitiesResponse(CapabilitiesResponse),
    /// `Session.AuthenticateContinue`.
    AuthenticateContinue(AuthenticateContinue),
    /// `Session.AuthenticateOk`.
    AuthenticateOk(AuthenticateOk),
    /// `Resultset.ColumnMetaData`.
    ColumnMetaData(ColumnMetaData),
    /// `Resultset.Row`.
    Row(Row),
    /// `Resultset.FetchDone`.
    FetchDone(FetchDone),
    /// `Resultset.FetchDoneMoreResultsets`.
    FetchDoneMoreResultsets(FetchDoneMoreResultsets),
    /// `Sql.StmtExecuteOk`.
    StmtExecuteOk(StmtExecuteOk),
    /// `Connection.CapabilitiesGet`.
    CapabilitiesGet(CapabilitiesGet),
    /// `Connection.CapabilitiesSet`.
    CapabilitiesSet(CapabilitiesSet),
    /// `Session.AuthenticateStart`.
    AuthenticateStart(AuthenticateStart),
    /// `Session.Reset`.
    SessionReset(SessionReset),
    /// `Session.Close`.
    SessionClose(SessionClose),
    /// `Connection.Close`.
    ConnectionClose(ConnectionClose),
    /// `Sql.StmtExecute`.
    StmtExecute(StmtExecute),
    /// `Crud.Find`.
    CrudFind(Find),
    /// `Crud.Insert`.
    CrudInsert(Insert),
    /// `Crud.Update`.
    CrudUpdate(Update),
    /// `Crud.Delete`.
    CrudDelete(Delete),
    /// `Expect.Open`.
    ExpectOpen(ExpectOpen),
    /// `Expect.Close`.
    ExpectClose(ExpectClose),
}

/// Whether a decoder is registered for `(dir, tag)`, excluding the
/// engine-handled `Error`/`Notice` tags.
pub(crate) fn has_decoder(dir: Direction, tag: u8) -> bool {
    match dir {
        Direction::FromServer => SERVER_TAGS.contains(&tag),
        Direction::FromClient => CLIENT_TAGS.contains(&tag),
    }
}

fn wrap<T: MessageDecode>(tag: u8, payload: &[u8]) -> Result<T> {
    T::decode(payload).map_err(|e| ProtocolError::Decode { tag, reason: e.to_string() })
}

/// Decodes a frame's payload given its direction and type tag. Total per
/// direction over the tags [`has_decoder`] accepts; any other tag yields
/// [`ProtocolError::UnknownMessage`].
pub(crate) fn decode(dir: Direction, tag: u8, payload: &[u8]) -> Result<Message> {
    match dir {
        Direction::FromServer => {
            if tag == ServerTag::Ok as u8 {
                wrap(tag, payload).map(Message::Ok)
            } else if tag == ServerTag::CapabilitiesResponse as u8 {
                wrap(tag, payload).map(Message::CapabilitiesResponse)
            } else if tag == ServerTag::SessAuthenticateContinue as u8 {
                wrap(tag, payload).map(Message::AuthenticateContinue)
            } else if tag == ServerTag::SessAuthenticateOk as u8 {
                wrap(tag, payload).map(Message::AuthenticateOk)
            } else if tag == ServerTag::ResultsetColumnMetaData as u8 {
                wrap(tag, payload).map(Message::ColumnMetaData)
            } else if tag == ServerTag::ResultsetRow as u8 {
                wrap(tag, payload).map(Message::Row)
            } else if tag == ServerTag::ResultsetFetchDone as u8 {
                wrap(tag, payload).map(Message::FetchDone)
            } else if tag == ServerTag::ResultsetFetchDoneMoreResultsets as u8 {
                wrap(tag, payload).map(Message::FetchDoneMoreResultsets)
            } else if tag == ServerTag::SqlStmtExecuteOk as u8 {
                wrap(tag, payload).map(Message::StmtExecuteOk)
            } else {
                Err(ProtocolError::UnknownMessage { tag })
            }
        }
        Direction::FromClient => {
            if tag == ClientTag::ConCapabilitiesGet as u8 {
                wrap(tag, payload).map(Message::CapabilitiesGet)
            } else if tag == ClientTag::ConCapabilitiesSet as u8 {
                wrap(tag, payload).map(Message::CapabilitiesSet)
            } else if tag == ClientTag::SessAuthenticateStart as u8 {
                wrap(tag, payload).map(Message::AuthenticateStart)
            } else if tag == ClientTag::SessAuthenticateContinue as u8 {
                wrap(tag, payload).map(Message::AuthenticateContinue)
            } else if tag == ClientTag::ConClose as u8 {
                wrap(tag, payload).map(Message::ConnectionClose)
            } else if tag == ClientTag::SessReset as u8 {
                wrap(tag, payload).map(Message::SessionReset)
            } else if tag == ClientTag::SessClose as u8 {
                wrap(tag, payload).map(Message::SessionClose)
            } else if tag == ClientTag::SqlStmtExecute as u8 {
                wrap(tag, payload).map(Message::StmtExecute)
            } else if tag == ClientTag::CrudFind as u8 {
                wrap(tag, payload).map(Message::CrudFind)
            } else if tag == ClientTag::CrudInsert as u8 {
                wrap(tag, payload).map(Message::CrudInsert)
            } else if tag == ClientTag::CrudUpdate as u8 {
                wrap(tag, payload).map(Message::CrudUpdate)
            } else if tag == ClientTag::CrudDelete as u8 {
                wrap(tag, payload).map(Message::CrudDelete)
            } else if tag == ClientTag::ExpectOpen as u8 {
                wrap(tag, payload).map(Message::ExpectOpen)
            } else if tag == ClientTag::ExpectClose as u8 {
                wrap(tag, payload).map(Message::ExpectClose)
            } else {
                Err(ProtocolError::UnknownMessage { tag })
            }
        }
    }
}

/// Dispatches a decoded message to the matching typed callback on `processor`.
pub(crate) fn dispatch(msg: &Message, processor: &mut dyn Processor) {
    match msg {
        Message::Ok(m) => processor.ok(m),
        Message::CapabilitiesResponse(m) => processor.capabilities_response(m),
        Message::AuthenticateContinue(m) => processor.authenticate_continue(m),
        Message::AuthenticateOk(m) => processor.authenticate_ok(m),
        Message::ColumnMetaData(m) => processor.column_meta_data(m),
        Message::Row(m) => processor.row(m),
        Message::FetchDone(_) => processor.fetch_done(),
        Message::FetchDoneMoreResultsets(_) => processor.fetch_done_more_resultsets(),
        Message::StmtExecuteOk(_) => processor.stmt_execute_ok(),
        Message::CapabilitiesGet(m) => processor.capabilities_get(m),
        Message::CapabilitiesSet(m) => processor.capabilities_set(m),
        Message::AuthenticateStart(m) => processor.authenticate_start(m),
        Message::SessionReset(m) => processor.session_reset(m),
        Message::SessionClose(m) => processor.session_close(m),
        Message::ConnectionClose(m) => processor.connection_close(m),
        Message::StmtExecute(m) => processor.stmt_execute(m),
        Message::CrudFind(m) => processor.crud_find(m),
        Message::CrudInsert(m) => processor.crud_insert(m),
        Message::CrudUpdate(m) => processor.crud_update(m),
        Message::CrudDelete(m) => processor.crud_delete(m),
        Message::ExpectOpen(m) => processor.expect_open(m),
        Message::ExpectClose(m) => processor.expect_close(m),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use crate::protocol::codec::{MessageEncode, ProtoWriter};

    #[test]
    fn decodes_a_known_server_tag() {
        let ok = OkMessage { msg: Some("done".into()) };
        let mut buf = Vec::new();
        ok.encode(&mut ProtoWriter::new(&mut buf));

        let msg = decode(Direction::FromServer, ServerTag::Ok as u8, &buf).unwrap();
        assert_eq!(msg, Message::Ok(ok));
    }

    #[test]
    fn unknown_server_tag_is_rejected() {
        let err = decode(Direction::FromServer, 0xEE, &[]).unwrap_err();
        assert_matches!(err, ProtocolError::UnknownMessage { tag: 0xEE });
    }

    #[test]
    fn a_client_tag_is_not_a_server_tag() {
        assert!(!has_decoder(Direction::FromServer, ClientTag::CrudFind as u8));
        assert!(has_decoder(Direction::FromClient, ClientTag::CrudFind as u8));
    }

    #[test]
    fn dispatch_routes_to_the_matching_callback() {
        #[derive(Default)]
        struct Seen(bool);
        impl Processor for Seen {
            fn row(&mut self, _msg: &Row) {
                self.0 = true;
            }
        }

        let mut seen = Seen::default();
        dispatch(&Message::Row(Row { fields: vec![b"x".to_vec()] }), &mut seen);
        assert!(seen.0);
    }
}
