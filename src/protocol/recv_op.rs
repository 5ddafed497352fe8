//! The staged receive state machine (§4.3) — the hardest part of the engine.
//!
//! Drives zero-or-more incoming frames through decode and dispatch,
//! suspending cooperatively at `FrameCodec`'s read boundaries and resuming
//! when the caller next pumps the operation. `Error`/`Notice` get a
//! cross-cutting rule of their own; everything else is governed by a
//! per-variant whitelist and terminator.

use std::any::Any;

use super::error::{ProtocolError, Result};
use super::frame_codec::FrameCodec;
use super::message::{NoticeFrame, ServerError};
use super::processor::{ControlFlow, Processor};
use super::registry;
use super::stream::ByteStream;
use super::tag::{Direction, ERROR_TAG, NOTICE_TAG};

/// The outcome of presenting a newly-seen, non-`Error`/`Notice` type tag to a
/// [`RecvVariant`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum NextMsg {
    /// The tag is expected; proceed to read and dispatch its payload.
    Expected,
    /// The tag is not expected in the variant's current state. The payload is
    /// still drained from the stream but not decoded, and a deferred
    /// [`ProtocolError::UnexpectedMessage`] is raised at the next stage
    /// boundary.
    Unexpected,
    /// Stop without consuming this frame's payload. The header stays parsed
    /// so the next `RecvOp` resumes directly at the payload stage.
    Stop,
}

/// A specialization of [`RecvOp`] that whitelists the message types it
/// expects and decides when to keep looping for another frame.
///
/// Every method defaults to the behavior of a receive that accepts any one
/// foreground message and never loops — i.e. [`SingleMessage`].
pub trait RecvVariant: Default {
    /// Decides whether `tag` (never `Error`/`Notice`, which are handled
    /// before this is consulted) is expected right now.
    fn do_next_msg(&mut self, _tag: u8) -> NextMsg {
        NextMsg::Expected
    }

    /// After a foreground frame (tag `_tag`, never `Error`/`Notice`) has been
    /// fully dispatched, decides whether the `RecvOp` should read another
    /// frame (`true`) or finish (`false`).
    fn do_process_next(&mut self, _tag: u8) -> bool {
        false
    }
}

/// The default variant: accepts any single foreground message and never
/// loops past it, matching the Open Question resolution recorded in
/// `DESIGN.md`.
#[derive(Debug, Default)]
pub struct SingleMessage;

impl RecvVariant for SingleMessage {}

/// Reads any number of `Resultset.Row` frames, terminated by either
/// `Resultset.FetchDone` or `Resultset.FetchDoneMoreResultsets`.
#[derive(Debug, Default)]
pub struct ReadRows {
    more_resultsets: bool,
}

impl ReadRows {
    /// Whether the terminating frame was `FetchDoneMoreResultsets` rather
    /// than a plain `FetchDone` — i.e. whether another result set follows.
    pub fn more_resultsets(&self) -> bool {
        self.more_resultsets
    }
}

impl RecvVariant for ReadRows {
    fn do_next_msg(&mut self, tag: u8) -> NextMsg {
        if is_row_or_fetch_done(tag) {
            NextMsg::Expected
        } else {
            NextMsg::Unexpected
        }
    }

    fn do_process_next(&mut self, tag: u8) -> bool {
        if tag == super::tag::ServerTag::ResultsetFetchDoneMoreResultsets as u8 {
            self.more_resultsets = true;
        }
        tag == super::tag::ServerTag::ResultsetRow as u8
    }
}

fn is_row_or_fetch_done(tag: u8) -> bool {
    use super::tag::ServerTag;
    tag == ServerTag::ResultsetRow as u8
        || tag == ServerTag::ResultsetFetchDone as u8
        || tag == ServerTag::ResultsetFetchDoneMoreResultsets as u8
}

/// Reads any number of `Resultset.ColumnMetaData` frames, stopping (without
/// consuming it) at the first frame that isn't one — the rows of the same
/// result set, which belong to the caller's next `RecvOp`.
#[derive(Debug, Default)]
pub struct ReadMetadata;

impl RecvVariant for ReadMetadata {
    fn do_next_msg(&mut self, tag: u8) -> NextMsg {
        if tag == super::tag::ServerTag::ResultsetColumnMetaData as u8 {
            NextMsg::Expected
        } else {
            NextMsg::Stop
        }
    }

    fn do_process_next(&mut self, tag: u8) -> bool {
        tag == super::tag::ServerTag::ResultsetColumnMetaData as u8
    }
}

/// Reads a `Sql.StmtExecute` round trip: interleaved column metadata, rows,
/// and fetch-done frames across possibly multiple result sets, terminated by
/// `Sql.StmtExecuteOk`.
#[derive(Debug, Default)]
pub struct ExecuteStatement;

impl RecvVariant for ExecuteStatement {
    fn do_next_msg(&mut self, tag: u8) -> NextMsg {
        use super::tag::ServerTag;
        if is_row_or_fetch_done(tag)
            || tag == ServerTag::ResultsetColumnMetaData as u8
            || tag == ServerTag::SqlStmtExecuteOk as u8
        {
            NextMsg::Expected
        } else {
            NextMsg::Unexpected
        }
    }

    fn do_process_next(&mut self, tag: u8) -> bool {
        tag != super::tag::ServerTag::SqlStmtExecuteOk as u8
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Stage {
    Header,
    Payload,
    Finished,
}

/// One staged, resumable receive operation, parameterized by the
/// [`RecvVariant`] that governs which messages it expects and when it stops.
///
/// A `RecvOp` is allocated by [`super::engine::ProtocolEngine`] on the first
/// receive after the previous one finished, and persists across any number
/// of [`Self::cont`]/[`Self::wait`] calls — including any number of `Notice`
/// frames interleaved with its foreground messages (I4) — until it reaches
/// [`Self::is_done`].
#[derive(Debug)]
pub struct RecvOp<V: RecvVariant> {
    variant: V,
    stage: Stage,
    skip: bool,
    tag: u8,
    deferred: Option<ProtocolError>,
}

impl<V: RecvVariant> RecvOp<V> {
    /// Starts a fresh receive in its initial state.
    pub fn new() -> Self {
        RecvOp {
            variant: V::default(),
            stage: Stage::Header,
            skip: false,
            tag: 0,
            deferred: None,
        }
    }

    /// The variant driving this receive, for inspecting post-completion state
    /// (e.g. [`ReadRows::more_resultsets`]).
    pub fn variant(&self) -> &V {
        &self.variant
    }

    /// Whether this receive has finished: either it hit its variant's
    /// terminator, its processor requested [`ControlFlow::Stop`], or it
    /// dispatched an `Error` frame (I5).
    pub fn is_done(&self) -> bool {
        self.stage == Stage::Finished
    }

    /// Drives the receive without blocking, returning `Ok(false)` if the
    /// stream would block mid-frame. A deferred error (I6) is raised exactly
    /// once, at the end of the frame that captured it, even when that frame
    /// otherwise completed successfully and the op keeps going.
    pub fn cont(
        &mut self,
        codec: &mut FrameCodec,
        stream: &mut dyn ByteStream,
        processor: &mut dyn Processor,
        dir: Direction,
    ) -> Result<bool> {
        loop {
            match self.stage {
                Stage::Finished => return Ok(true),
                Stage::Header => {
                    if !codec.read_header(stream)? {
                        return Ok(false);
                    }

                    let tag = codec.current_tag();
                    self.tag = tag;

                    if tag == ERROR_TAG || tag == NOTICE_TAG {
                        self.skip = false;
                    } else {
                        match self.variant.do_next_msg(tag) {
                            NextMsg::Expected => self.skip = false,
                            NextMsg::Unexpected => {
                                self.deferred = Some(ProtocolError::UnexpectedMessage { tag });
                                self.skip = true;
                            }
                            NextMsg::Stop => {
                                self.stage = Stage::Finished;
                                return Ok(true);
                            }
                        }
                    }

                    self.stage = Stage::Payload;
                }
                Stage::Payload => {
                    if !codec.read_payload(stream)? {
                        return Ok(false);
                    }

                    let should_loop = self.dispatch(codec, processor, dir);
                    codec.finish_frame();

                    if should_loop {
                        self.stage = Stage::Header;
                        self.skip = false;
                        if let Some(err) = self.deferred.take() {
                            return Err(err);
                        }
                    } else {
                        self.stage = Stage::Finished;
                        let err = self.deferred.take();
                        return match err {
                            Some(err) => Err(err),
                            None => Ok(true),
                        };
                    }
                }
            }
        }
    }

    /// Blocks until this receive finishes one round of work: a foreground
    /// message is dispatched (and `is_done()` becomes true), or an error
    /// (deferred or from the stream) is returned.
    pub fn wait(
        &mut self,
        codec: &mut FrameCodec,
        stream: &mut dyn ByteStream,
        processor: &mut dyn Processor,
        dir: Direction,
    ) -> Result<()> {
        while !self.cont(codec, stream, processor, dir)? {}
        Ok(())
    }

    /// The dispatch stage (§4.3 step 3): `message_begin`, the optional raw
    /// payload, the `Error`/`Notice`/typed-dispatch branch, then
    /// `message_end`. Returns whether the continuation stage (step 4) should
    /// loop back to another header.
    fn dispatch(&mut self, codec: &FrameCodec, processor: &mut dyn Processor, dir: Direction) -> bool {
        let tag = self.tag;
        let payload = codec.payload();

        if !self.skip && tag != ERROR_TAG && tag != NOTICE_TAG && !registry::has_decoder(dir, tag) {
            log::warn!("no decoder registered for message type {tag}");
            self.deferred = Some(ProtocolError::UnknownMessage { tag });
            self.skip = true;
        }

        processor.message_begin(tag, payload.len() as u32);
        if processor.wants_raw_payload() {
            processor.raw_payload(payload);
        }

        let mut should_loop;
        if tag == ERROR_TAG {
            match <ServerError as super::codec::MessageDecode>::decode(payload) {
                Ok(err) => {
                    log::error!("server error {} ({}): {}", err.code, err.sql_state, err.message);
                    processor.error(&err);
                }
                Err(err) => self.deferred = Some(err),
            }
            should_loop = false;
        } else if tag == NOTICE_TAG {
            if !self.skip {
                match <NoticeFrame as super::codec::MessageDecode>::decode(payload) {
                    Ok(notice) => processor.notice(&notice),
                    Err(err) => self.deferred = Some(err),
                }
            }
            should_loop = true;
        } else {
            if !self.skip {
                match registry::decode(dir, tag, payload) {
                    Ok(msg) => registry::dispatch(&msg, processor),
                    Err(err) => {
                        log::warn!("failed to decode message type {tag}: {err}");
                        self.deferred = Some(err);
                    }
                }
            }
            should_loop = self.variant.do_process_next(tag);
        }

        if processor.message_end() == ControlFlow::Stop {
            should_loop = false;
        }

        should_loop
    }
}

impl<V: RecvVariant> Default for RecvOp<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Object-safe view of a [`RecvOp`], letting [`super::engine::ProtocolEngine`]
/// hold one behind a single `recv_slot` regardless of its `RecvVariant`.
pub(crate) trait RecvOpDyn {
    fn cont_dyn(
        &mut self,
        codec: &mut FrameCodec,
        stream: &mut dyn ByteStream,
        processor: &mut dyn Processor,
        dir: Direction,
    ) -> Result<bool>;

    fn wait_dyn(
        &mut self,
        codec: &mut FrameCodec,
        stream: &mut dyn ByteStream,
        processor: &mut dyn Processor,
        dir: Direction,
    ) -> Result<()>;

    fn is_done_dyn(&self) -> bool;

    fn as_any(&self) -> &dyn Any;
}

impl<V: RecvVariant + 'static> RecvOpDyn for RecvOp<V> {
    fn cont_dyn(
        &mut self,
        codec: &mut FrameCodec,
        stream: &mut dyn ByteStream,
        processor: &mut dyn Processor,
        dir: Direction,
    ) -> Result<bool> {
        self.cont(codec, stream, processor, dir)
    }

    fn wait_dyn(
        &mut self,
        codec: &mut FrameCodec,
        stream: &mut dyn ByteStream,
        processor: &mut dyn Processor,
        dir: Direction,
    ) -> Result<()> {
        self.wait(codec, stream, processor, dir)
    }

    fn is_done_dyn(&self) -> bool {
        self.is_done()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
