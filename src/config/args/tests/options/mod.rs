mod dry_run;
mod estimate;
mod fixup;
mod key_source;
mod timeout;
mod tracing;
