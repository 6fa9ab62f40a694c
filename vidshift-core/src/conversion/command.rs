//! ffmpeg argument construction.
//!
//! Argument order:
//!
//! ```text
//! -i <input> -c:v <encoder> -b:v <bitrate> -preset <preset>
//! -c:a <audio codec> -b:a <audio bitrate> -progress pipe:1
//! [-vf scale=W:H] [-r <fps>] [-crf <n>] [-threads <n>] [-af <filter>]
//! [-map_metadata -1] [-f <container>] <output>
//! ```

use super::params::ConversionParams;

use ffmpeg_sidecar::command::FfmpegCommand;

/// Builds the ffmpeg argument list (without the program name).
pub fn build_args(params: &ConversionParams) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "-i".into(),
        params.input_path.to_string_lossy().into_owned(),
        "-c:v".into(),
        params.encoder.clone(),
        "-b:v".into(),
        params.video_bitrate.clone(),
        "-preset".into(),
        params.preset.clone(),
        "-c:a".into(),
        params.audio_codec.clone(),
        "-b:a".into(),
        params.audio_bitrate.clone(),
        "-progress".into(),
        "pipe:1".into(),
    ];

    if let Some(scale) = &params.scale {
        args.push("-vf".into());
        args.push(format!("scale={scale}"));
    }
    if let Some(fps) = &params.framerate {
        args.push("-r".into());
        args.push(fps.clone());
    }
    if let Some(crf) = params.crf {
        args.push("-crf".into());
        args.push(crf.to_string());
    }
    if let Some(threads) = params.thread_count {
        args.push("-threads".into());
        args.push(threads.to_string());
    }
    if let Some(filter) = &params.audio_filter {
        args.push("-af".into());
        args.push(filter.clone());
    }
    if params.strip_metadata {
        args.push("-map_metadata".into());
        args.push("-1".into());
    }
    if let Some(container) = &params.container_format {
        args.push("-f".into());
        args.push(container.clone());
    }

    args.push(params.output_path.to_string_lossy().into_owned());
    args
}

/// Builds the ready-to-spawn ffmpeg command.
pub fn build_command(params: &ConversionParams) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new();
    cmd.args(build_args(params));
    cmd
}
