use anyhow::Context;
use crossbeam_channel::Sender;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

/// 成功响应的另存为副作用
///
/// `save` 必须立即返回，不能阻塞视口拿到资源。
pub trait DownloadSink: Send + Sync {
    fn save(&self, file_name: &str, payload: Arc<[u8]>);
}

enum WriterMessage {
    Write { file_name: String, payload: Arc<[u8]> },
    /// 之前的写入全部完成后回复
    Flush(Sender<()>),
}

/// 写入本地目录
///
/// 所有写入由同一个 writer 线程按 `save` 的调用顺序执行，同名文件以最后一次 `save` 为准。
/// Drop 时等待队列中的写入全部结束，进程退出前文件一定落盘。
pub struct FsDownloadSink {
    dir: PathBuf,
    sender: Option<Sender<WriterMessage>>,
    writer_thread: Option<thread::JoinHandle<()>>,
}

// new & init
impl FsDownloadSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let (tx, rx) = crossbeam_channel::unbounded::<WriterMessage>();

        let writer_dir = dir.clone();
        let writer_thread = thread::Builder::new()
            .name("Download-Writer".to_string())
            .spawn(move || {
                while let Ok(message) = rx.recv() {
                    match message {
                        WriterMessage::Write { file_name, payload } => {
                            match write_download(&writer_dir, &file_name, &payload) {
                                Ok(path) => log::info!("saved {} bytes to {:?}", payload.len(), path),
                                Err(e) => log::error!("Failed to save download {}: {:?}", file_name, e),
                            }
                        }
                        WriterMessage::Flush(ack) => {
                            let _ = ack.send(());
                        }
                    }
                }
            })
            .expect("Failed to spawn download writer thread");

        Self {
            dir,
            sender: Some(tx),
            writer_thread: Some(writer_thread),
        }
    }
}
// getter
impl FsDownloadSink {
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
// tools
impl FsDownloadSink {
    /// 等待所有已触发的写入完成
    pub fn flush(&self) {
        let Some(sender) = &self.sender else {
            return;
        };
        let (ack_tx, ack_rx) = crossbeam_channel::bounded(1);
        if sender.send(WriterMessage::Flush(ack_tx)).is_err() || ack_rx.recv().is_err() {
            log::error!("download writer thread is gone, flush skipped");
        }
    }
}

impl DownloadSink for FsDownloadSink {
    fn save(&self, file_name: &str, payload: Arc<[u8]>) {
        let Some(sender) = &self.sender else {
            return;
        };
        let message = WriterMessage::Write {
            file_name: file_name.to_string(),
            payload,
        };
        if let Err(e) = sender.send(message) {
            log::error!("Failed to queue download {}: {}", file_name, e);
        }
    }
}

impl Drop for FsDownloadSink {
    fn drop(&mut self) {
        // 先关闭队列，writer 处理完剩余消息后退出
        self.sender = None;

        if let Some(thread) = self.writer_thread.take()
            && thread.join().is_err()
        {
            log::error!("Failed to join download writer thread");
        }
    }
}

/// 写出 `dir/file_name`，目录不存在时创建
pub fn write_download(dir: &Path, file_name: &str, payload: &[u8]) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("创建下载目录失败: {:?}", dir))?;

    let path = dir.join(file_name);
    fs::write(&path, payload).with_context(|| format!("写入文件失败: {:?}", path))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_into_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("downloads");

        let path = write_download(&target, "model.stl", b"solid").unwrap();
        assert_eq!(path, target.join("model.stl"));
        assert_eq!(fs::read(path).unwrap(), b"solid");
    }

    #[test]
    fn sink_flushes_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        {
            let sink = FsDownloadSink::new(dir.path());
            sink.save("model.obj", Arc::from(&b"v 0 0 0"[..]));
        }
        assert_eq!(fs::read(dir.path().join("model.obj")).unwrap(), b"v 0 0 0");
    }

    #[test]
    fn later_save_overwrites_same_name() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsDownloadSink::new(dir.path());
        sink.save("model.stl", Arc::from(&b"first"[..]));
        sink.flush();
        sink.save("model.stl", Arc::from(&b"second"[..]));
        sink.flush();
        assert_eq!(fs::read(dir.path().join("model.stl")).unwrap(), b"second");
    }

    #[test]
    fn writes_follow_save_order() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsDownloadSink::new(dir.path());

        for _ in 0..5 {
            sink.save("model.stl", Arc::from(vec![1u8; 16 * 1024 * 1024]));
            sink.save("model.stl", Arc::from(vec![2u8; 8]));
        }
        sink.flush();

        assert_eq!(fs::read(dir.path().join("model.stl")).unwrap(), vec![2u8; 8]);
    }
}
