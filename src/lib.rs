pub mod captions;
pub mod io;
pub mod models;
pub mod stages;

pub use captions::{parse_cues, parse_timestamp};
pub use io::{
    parse_asr_json, parse_diarization_json, read_asr_file, read_caption_file,
    read_diarization_file, HumanTranscript, InputError, ReconciledTranscript, RunMetadata,
};
pub use models::{
    AsrUnit, DiarizationSegment, ReferenceCue, SpeakerMapping, TimeInterval, TranscriptPhrase,
};
pub use stages::{
    apply_mapping, assign, reconcile, MatchStrategy, ReconcileConfig, ReconcileResult,
    UNKNOWN_SPEAKER, UNNAMED_PARTICIPANT,
};
