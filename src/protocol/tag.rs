//! Type tags and the direction a message travels.

use enum_primitive_derive::Primitive;

/// Which half of the connection a message travels across.
///
/// Fixed at engine construction; selects which half of the [`registry`](super::registry)
/// is consulted for incoming frames.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Direction {
    /// Messages sent by the server, received by the client.
    FromServer,
    /// Messages sent by the client, received by the server.
    FromClient,
}

/// Type tags for messages the server sends to the client.
///
/// `Ok`, `Error`, and `Notice` are universal: every [`Direction::FromServer`]
/// frame carrying one of these tags is handled by the engine itself rather
/// than routed through a typed processor callback (`Ok` is the exception —
/// it is routed normally, but is always valid regardless of `RecvOp` variant).
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Primitive)]
pub enum ServerTag {
    /// Generic acknowledgement with no payload beyond an optional message.
    Ok = 0,
    /// An out-of-band server error. Handled by the engine; never reaches
    /// `do_process_msg`.
    Error = 1,
    /// Response to `Connection.CapabilitiesGet`/`CapabilitiesSet`.
    CapabilitiesResponse = 2,
    /// Continuation challenge during SASL authentication.
    SessAuthenticateContinue = 3,
    /// Successful completion of authentication.
    SessAuthenticateOk = 4,
    /// Out-of-band informational frame. Handled by the engine; never
    /// terminates a receive.
    Notice = 11,
    /// Column metadata for one result set column.
    ResultsetColumnMetaData = 12,
    /// One row of a result set.
    ResultsetRow = 13,
    /// The current result set is exhausted.
    ResultsetFetchDone = 14,
    /// The current result set is exhausted and more result sets follow.
    ResultsetFetchDoneMoreResultsets = 16,
    /// A `Sql.StmtExecute` completed successfully.
    SqlStmtExecuteOk = 17,
}

/// Type tags for messages the client sends to the server.
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Primitive)]
pub enum ClientTag {
    /// Request the server's capability set.
    ConCapabilitiesGet = 1,
    /// Negotiate capabilities.
    ConCapabilitiesSet = 2,
    /// Begin SASL authentication.
    SessAuthenticateStart = 3,
    /// Continue SASL authentication.
    SessAuthenticateContinue = 4,
    /// Politely close the connection.
    ConClose = 5,
    /// Reset the session, discarding server-side state.
    SessReset = 6,
    /// Close the session.
    SessClose = 7,
    /// Execute a SQL statement.
    SqlStmtExecute = 12,
    /// A CRUD find (query) operation.
    CrudFind = 17,
    /// A CRUD insert operation.
    CrudInsert = 18,
    /// A CRUD update operation.
    CrudUpdate = 19,
    /// A CRUD delete operation.
    CrudDelete = 20,
    /// Open an `Expect` block, making subsequent statements conditional.
    ExpectOpen = 24,
    /// Close the innermost open `Expect` block.
    ExpectClose = 25,
}

pub(crate) const ERROR_TAG: u8 = ServerTag::Error as u8;
pub(crate) const NOTICE_TAG: u8 = ServerTag::Notice as u8;
