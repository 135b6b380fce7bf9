//! 编码器端到端测试：协作方全部用内存实现替代

use anyhow::Result;
use async_trait::async_trait;
use multimsg::api::{
    ElementType, EncoderContext, ForwardUploader, ImageFormat, MediaDescriptor, RichMediaApi,
};
use multimsg::element::{Elem, Envelope, MSG_TYPE_C2C, MSG_TYPE_GROUP};
use multimsg::forward_card;
use multimsg::segment::{ForwardData, ImageData, NodeData, Segment};
use multimsg::{BotIdentity, MessageEncoder, NewsEntry, Peer};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// 富媒体协作方的内存实现：解析时落一个临时文件，上传原样回显
#[derive(Default)]
struct MockMedia {
    /// 让解析产物是空文件，模拟损坏的媒体
    zero_byte: bool,
}

#[async_trait]
impl RichMediaApi for MockMedia {
    async fn resolve_media_source(&self, image: &ImageData) -> Result<PathBuf> {
        let path = std::env::temp_dir().join(format!(
            "multimsg-test-{}-{}",
            uuid::Uuid::new_v4(),
            image.file
        ));
        let bytes: &[u8] = if self.zero_byte {
            &[]
        } else {
            &[0x89, b'P', b'N', b'G']
        };
        tokio::fs::write(&path, bytes).await?;
        Ok(path)
    }

    async fn upload_file(
        &self,
        path: &Path,
        _element_type: ElementType,
        _busi_type: i32,
    ) -> Result<PathBuf> {
        Ok(path.with_extension("uploaded"))
    }

    async fn upload_media_descriptor(
        &self,
        remote_path: &Path,
        _chat_kind: i32,
        _owner_uid: &str,
    ) -> Result<MediaDescriptor> {
        Ok(MediaDescriptor {
            file_id: "FID-1".to_string(),
            md5: "0123456789abcdef0123456789abcdef".to_string(),
            sha1: "da39a3ee5e6b4b0d3255bfef95601890afd80709".to_string(),
            file_name: remote_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            file_size: 4,
            width: 100,
            height: 50,
            format: ImageFormat::Png,
        })
    }
}

/// 转发上传协作方：记录每次上传的封包条数，按调用序发放 resid
#[derive(Default)]
struct MockForward {
    calls: Mutex<Vec<usize>>,
}

impl MockForward {
    fn envelope_counts(&self) -> Vec<usize> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ForwardUploader for MockForward {
    async fn upload_forward(&self, _peer: &Peer, envelopes: &[Envelope]) -> Result<String> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(envelopes.len());
        Ok(format!("RESID-{}", calls.len()))
    }
}

fn context(media: MockMedia, forward: Arc<MockForward>) -> EncoderContext {
    EncoderContext {
        media: Arc::new(media),
        forward,
        identity: BotIdentity {
            uin: 10000,
            uid: "u_self".to_string(),
            nick: "Bot".to_string(),
        },
    }
}

fn group_encoder() -> (MessageEncoder, Arc<MockForward>) {
    let forward = Arc::new(MockForward::default());
    let ctx = context(MockMedia::default(), forward.clone());
    (MessageEncoder::new(ctx, Peer::group("284840486")), forward)
}

fn node(name: &str, content: Vec<Segment>) -> Segment {
    Segment::Node(NodeData {
        name: Some(name.to_string()),
        content,
        ..Default::default()
    })
}

/// levels 层 node 嵌套，最内层节点只含一条文本
fn nested_chain(levels: usize) -> Segment {
    let mut segment = node("最内层", vec![Segment::text("bottom")]);
    for level in (1..levels).rev() {
        segment = node(&format!("第{level}层"), vec![segment]);
    }
    segment
}

#[tokio::test]
async fn text_only_input_yields_no_envelopes() {
    let forward = Arc::new(MockForward::default());
    let ctx = context(MockMedia::default(), forward.clone());
    let mut encoder = MessageEncoder::new(ctx, Peer::c2c("u_peer"));

    let bundle = encoder
        .generate(&[Segment::text("hi")], None)
        .await
        .unwrap();

    assert!(bundle.envelopes.is_empty());
    assert_eq!(bundle.tsum, 0);
    assert_eq!(bundle.summary, "查看0条转发消息");
    assert_eq!(bundle.source, "聊天记录");
    assert_eq!(bundle.prompt, "[聊天记录]");
    assert!(bundle.news.is_empty());
    assert!(forward.envelope_counts().is_empty());
}

#[tokio::test]
async fn single_node_produces_one_envelope_with_news() {
    let (mut encoder, _) = group_encoder();
    let segments = vec![Segment::Node(NodeData {
        uin: Some("10001".to_string()),
        name: Some("Alice".to_string()),
        content: vec![Segment::text("a")],
        ..Default::default()
    })];

    let bundle = encoder.generate(&segments, None).await.unwrap();

    assert_eq!(bundle.tsum, 1);
    assert_eq!(bundle.envelopes.len(), 1);
    assert_eq!(bundle.news, vec![NewsEntry::new("Alice: a")]);
    assert_eq!(bundle.summary, "查看1条转发消息");
    assert_eq!(bundle.source, "群聊的聊天记录");

    let envelope = &bundle.envelopes[0];
    assert_eq!(
        envelope.elems(),
        &[Elem::Text {
            str: "a".to_string()
        }]
    );
    assert_eq!(envelope.content_head.msg_type, MSG_TYPE_GROUP);
    assert_eq!(envelope.routing_head.from_uin, 10001);
    assert_eq!(
        envelope.routing_head.group.as_ref().unwrap().group_card,
        "Alice"
    );
    assert!(envelope.routing_head.c2c.is_none());
}

#[tokio::test]
async fn unattributed_node_falls_back_to_identity() {
    let forward = Arc::new(MockForward::default());
    let ctx = context(MockMedia::default(), forward);
    let mut encoder = MessageEncoder::new(ctx, Peer::c2c("u_peer"));

    let bundle = encoder
        .generate(
            &[Segment::Node(NodeData {
                content: vec![Segment::text("x")],
                ..Default::default()
            })],
            None,
        )
        .await
        .unwrap();

    let envelope = &bundle.envelopes[0];
    assert_eq!(envelope.content_head.msg_type, MSG_TYPE_C2C);
    assert_eq!(envelope.routing_head.from_uin, 10000);
    assert_eq!(
        envelope.routing_head.c2c.as_ref().unwrap().friend_name,
        "Bot"
    );
    assert_eq!(bundle.news, vec![NewsEntry::new("Bot: x")]);
}

#[tokio::test]
async fn seq_increases_per_flushed_turn() {
    let (mut encoder, _) = group_encoder();
    let segments = vec![
        node("A", vec![Segment::text("1")]),
        node("B", vec![Segment::text("2")]),
        node("C", vec![Segment::text("3")]),
    ];

    let bundle = encoder.generate(&segments, None).await.unwrap();

    assert_eq!(bundle.tsum, 3);
    let seqs: Vec<u32> = bundle
        .envelopes
        .iter()
        .map(|e| e.content_head.msg_seq)
        .collect();
    assert_eq!(seqs[1], seqs[0] + 1);
    assert_eq!(seqs[2], seqs[1] + 1);
}

#[tokio::test]
async fn news_is_capped_at_four_entries() {
    let (mut encoder, _) = group_encoder();
    let segments: Vec<Segment> = (0..6)
        .map(|i| node(&format!("U{i}"), vec![Segment::text(format!("m{i}"))]))
        .collect();

    let bundle = encoder.generate(&segments, None).await.unwrap();

    assert_eq!(bundle.tsum, 6);
    assert_eq!(bundle.envelopes.len(), 6);
    assert_eq!(bundle.news.len(), 4);
    assert_eq!(bundle.news[3], NewsEntry::new("U3: m3"));
}

#[tokio::test]
async fn four_level_nesting_encodes_fully() {
    let (mut encoder, forward) = group_encoder();

    let bundle = encoder.generate(&[nested_chain(4)], None).await.unwrap();

    assert_eq!(bundle.tsum, 1);
    // 深度优先：最内层先上传，三层嵌套各上传一次，每层恰好一条消息
    assert_eq!(forward.envelope_counts(), vec![1, 1, 1]);
}

#[tokio::test]
async fn fifth_nesting_level_is_dropped() {
    let (mut encoder, forward) = group_encoder();

    let bundle = encoder.generate(&[nested_chain(5)], None).await.unwrap();

    // 超限的分支被跳过：最深一次 generate 没有产出任何封包，
    // 也不会多出一次上传，其余层继续正常编码
    assert_eq!(bundle.tsum, 1);
    assert_eq!(forward.envelope_counts(), vec![0, 1, 1]);
}

#[tokio::test]
async fn nested_card_carries_synthesized_news_and_summary() {
    let (mut encoder, _) = group_encoder();
    let outer = node("Outer", vec![node("Bob", vec![Segment::text("hello")])]);

    let bundle = encoder.generate(&[outer], None).await.unwrap();

    assert_eq!(bundle.tsum, 1);
    assert_eq!(bundle.news, vec![NewsEntry::new("Outer: [聊天记录]")]);

    let Elem::LightApp { data } = &bundle.envelopes[0].elems()[0] else {
        panic!("expected LightApp elem");
    };
    let card = forward_card::unpack(data).unwrap();
    assert_eq!(card.meta.detail.resid, "RESID-1");
    assert_eq!(card.meta.detail.news, vec![NewsEntry::new("Bob: hello")]);
    assert_eq!(card.meta.detail.summary, "查看1条转发消息");
    assert_eq!(card.prompt, "[聊天记录]");
}

#[tokio::test]
async fn forward_by_resid_packs_card_in_place() {
    let (mut encoder, forward) = group_encoder();
    let segments = vec![node(
        "A",
        vec![Segment::Forward(ForwardData {
            id: Some("RES-X".to_string()),
            summary: Some("历史记录".to_string()),
            ..Default::default()
        })],
    )];

    let bundle = encoder.generate(&segments, None).await.unwrap();

    // 已有 resid 不触发递归上传
    assert!(forward.envelope_counts().is_empty());
    assert_eq!(bundle.news, vec![NewsEntry::new("A: [聊天记录]")]);

    let Elem::LightApp { data } = &bundle.envelopes[0].elems()[0] else {
        panic!("expected LightApp elem");
    };
    let card = forward_card::unpack(data).unwrap();
    assert_eq!(card.meta.detail.resid, "RES-X");
    assert_eq!(card.meta.detail.summary, "历史记录");
}

#[tokio::test]
async fn forward_content_without_nodes_is_skipped() {
    let (mut encoder, forward) = group_encoder();
    let segments = vec![node(
        "A",
        vec![
            Segment::Forward(ForwardData {
                content: Some(vec![Segment::text("不是节点")]),
                ..Default::default()
            }),
            Segment::text("tail"),
        ],
    )];

    let bundle = encoder.generate(&segments, None).await.unwrap();

    assert!(forward.envelope_counts().is_empty());
    assert_eq!(bundle.envelopes.len(), 1);
    assert_eq!(
        bundle.envelopes[0].elems(),
        &[Elem::Text {
            str: "tail".to_string()
        }]
    );
    assert_eq!(bundle.news, vec![NewsEntry::new("A: tail")]);
}

#[tokio::test]
async fn image_upload_builds_rich_media_elem_and_tracks_cleanup() {
    let (mut encoder, _) = group_encoder();
    let segments = vec![node(
        "Alice",
        vec![Segment::Image(ImageData {
            file: "sticker.png".to_string(),
            sub_type: Some(1),
            ..Default::default()
        })],
    )];

    let bundle = encoder.generate(&segments, None).await.unwrap();

    let envelope = &bundle.envelopes[0];
    match &envelope.elems()[0] {
        Elem::CommonElem {
            service_type,
            business_type,
            pb_elem,
        } => {
            assert_eq!(*service_type, 48);
            assert_eq!(*business_type, 20);
            assert!(!pb_elem.is_empty());
        }
        other => panic!("unexpected elem: {other:?}"),
    }
    assert_eq!(bundle.news, vec![NewsEntry::new("Alice: [动画表情]")]);

    // 本地解析产物 + 远端暂存路径都登记了清理
    let cleanup = encoder.take_cleanup_files();
    assert_eq!(cleanup.len(), 2);
    assert!(encoder.take_cleanup_files().is_empty());
}

#[tokio::test]
async fn nested_image_cleanup_bubbles_to_caller() {
    let (mut encoder, _) = group_encoder();
    let inner = node(
        "Bob",
        vec![Segment::Image(ImageData {
            file: "pic.jpg".to_string(),
            ..Default::default()
        })],
    );

    let bundle = encoder
        .generate(&[node("Outer", vec![inner])], None)
        .await
        .unwrap();

    assert_eq!(bundle.tsum, 1);
    assert_eq!(encoder.take_cleanup_files().len(), 2);
}

#[tokio::test]
async fn zero_byte_media_aborts_generate() {
    let forward = Arc::new(MockForward::default());
    let ctx = context(MockMedia { zero_byte: true }, forward.clone());
    let mut encoder = MessageEncoder::new(ctx, Peer::group("284840486"));
    let segments = vec![node(
        "Alice",
        vec![Segment::Image(ImageData {
            file: "broken.png".to_string(),
            ..Default::default()
        })],
    )];

    let err = encoder.generate(&segments, None).await.unwrap_err();

    assert!(err.to_string().contains("大小为 0"));
    assert!(err.to_string().contains("broken.png"));
    assert!(forward.envelope_counts().is_empty());
}

#[tokio::test]
async fn caller_options_override_computed_defaults() {
    let (mut encoder, _) = group_encoder();
    let options = forward_card::ForwardCardOptions {
        source: Some("某个群".to_string()),
        news: Some(vec![NewsEntry::new("自定义")]),
        summary: Some("自定义摘要".to_string()),
        prompt: Some("[记录]".to_string()),
    };

    let bundle = encoder
        .generate(&[node("A", vec![Segment::text("a")])], Some(options))
        .await
        .unwrap();

    assert_eq!(bundle.source, "某个群");
    assert_eq!(bundle.news, vec![NewsEntry::new("自定义")]);
    assert_eq!(bundle.summary, "自定义摘要");
    assert_eq!(bundle.prompt, "[记录]");
}
