//! 合并转发消息编码器
//!
//! 将 OneBot11 消息段序列编码为按发送者分组的封包消息列表，
//! 嵌套的合并转发通过递归实例化自身解决：内层先编码、上传换取
//! resid，再以转发卡片元素拼回外层。递归深度有硬上限。

use crate::api::{ElementType, EncoderContext, MediaDescriptor};
use crate::element::{
    C2cHead, ContentHead, Elem, Envelope, FALLBACK_GROUP_CODE, FALLBACK_UIN, ForwardHead,
    GroupHead, MSG_TYPE_C2C, MSG_TYPE_GROUP, MsgBody, RichText, RoutingHead,
};
use crate::forward_card::{self, ForwardCardOptions, NewsEntry};
use crate::segment::{NodeData, Segment};
use crate::{Peer, face, pb, warn};
use anyhow::{Result, bail};
use futures_util::future::BoxFuture;
use prost::Message;
use rand::Rng;
use std::path::PathBuf;

/// 合并转发最大嵌套深度
pub const MAX_FORWARD_DEPTH: u32 = 3;

/// generate 的产物：封包列表 + 卡片外显元数据
#[derive(Debug, Clone)]
pub struct ForwardBundle {
    pub envelopes: Vec<Envelope>,
    /// 实际落盘的消息条数
    pub tsum: u32,
    pub source: String,
    pub summary: String,
    pub news: Vec<NewsEntry>,
    pub prompt: String,
}

/// 编码器状态，一次 generate (顶层或嵌套) 对应一个实例
pub struct MessageEncoder {
    ctx: EncoderContext,
    peer: Peer,
    results: Vec<Envelope>,
    children: Vec<Elem>,
    delete_after_sent_files: Vec<PathBuf>,
    is_group: bool,
    seq: u32,
    tsum: u32,
    preview: String,
    news: Vec<NewsEntry>,
    name: Option<String>,
    uin: Option<i64>,
    depth: u32,
}

impl MessageEncoder {
    pub fn new(ctx: EncoderContext, peer: Peer) -> Self {
        Self::with_depth(ctx, peer, 0)
    }

    fn with_depth(ctx: EncoderContext, peer: Peer, depth: u32) -> Self {
        let is_group = peer.is_group();
        Self {
            ctx,
            peer,
            results: Vec::new(),
            children: Vec::new(),
            delete_after_sent_files: Vec::new(),
            is_group,
            seq: rand::rng().random_range(0..65430),
            tsum: 0,
            preview: String::new(),
            news: Vec::new(),
            name: None,
            uin: None,
            depth,
        }
    }

    /// 发送完成后需要删除的临时文件 (含各嵌套层合并上来的)
    pub fn take_cleanup_files(&mut self) -> Vec<PathBuf> {
        std::mem::take(&mut self.delete_after_sent_files)
    }

    /// 顶层入口：渲染整段消息列表并返回转发记录
    ///
    /// 外显参数优先取调用方传入值，缺省项按当前会话形态补默认。
    /// 消息边界只由 node 段划定，node 之外的段不触发 flush。
    pub async fn generate(
        &mut self,
        segments: &[Segment],
        options: Option<ForwardCardOptions>,
    ) -> Result<ForwardBundle> {
        self.render(segments).await?;
        let options = options.unwrap_or_default();
        Ok(ForwardBundle {
            envelopes: std::mem::take(&mut self.results),
            tsum: self.tsum,
            source: options.source.unwrap_or_else(|| {
                if self.is_group {
                    "群聊的聊天记录".to_string()
                } else {
                    "聊天记录".to_string()
                }
            }),
            summary: options
                .summary
                .unwrap_or_else(|| format!("查看{}条转发消息", self.tsum)),
            news: options
                .news
                .filter(|news| !news.is_empty())
                .unwrap_or_else(|| self.news.clone()),
            prompt: options.prompt.unwrap_or_else(|| "[聊天记录]".to_string()),
        })
    }

    /// 依次访问每个消息段
    pub async fn render(&mut self, segments: &[Segment]) -> Result<()> {
        for segment in segments {
            self.visit(segment).await?;
        }
        Ok(())
    }

    /// 消息段访问器：一个输入段映射为零或多个可渲染元素。
    /// node 的嵌套转发会经由 generate 间接递归回到这里，返回值装箱。
    pub fn visit<'a>(&'a mut self, segment: &'a Segment) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            match segment {
                Segment::Text { text } => {
                    self.children.push(Elem::Text { str: text.clone() });
                    self.preview.push_str(text);
                }
                Segment::Face { id } => {
                    self.children.push(Elem::Face {
                        index: id.parse().unwrap_or_default(),
                    });
                    if let Some(label) = face::resolve_face_label(id) {
                        self.preview.push_str(label);
                    }
                }
                Segment::Image(image) => {
                    let busi_type = image.sub_type.unwrap_or(0);
                    let pic_path = self.ctx.media.resolve_media_source(image).await?;
                    self.delete_after_sent_files.push(pic_path.clone());

                    let file_size = tokio::fs::metadata(&pic_path).await?.len();
                    if file_size == 0 {
                        bail!("文件异常，大小为 0: {}", pic_path.display());
                    }

                    let remote_path = self
                        .ctx
                        .media
                        .upload_file(&pic_path, ElementType::Pic, busi_type)
                        .await?;
                    let (chat_kind, owner_uid) = if self.is_group {
                        (4, self.peer.peer_uid.clone())
                    } else {
                        (3, self.ctx.identity.uid.clone())
                    };
                    let descriptor = self
                        .ctx
                        .media
                        .upload_media_descriptor(&remote_path, chat_kind, &owner_uid)
                        .await?;

                    let elem = self.pack_image(&descriptor, busi_type);
                    self.children.push(elem);
                    self.preview
                        .push_str(if busi_type == 1 { "[动画表情]" } else { "[图片]" });
                    self.delete_after_sent_files.push(remote_path);
                }
                Segment::Markdown { content } => {
                    let payload = pb::MarkdownContent {
                        content: content.clone(),
                    };
                    self.children.push(Elem::CommonElem {
                        service_type: 45,
                        pb_elem: payload.encode_to_vec(),
                        business_type: 1,
                    });
                    let snippet = content.replace(['\r', '\n'], " ");
                    self.preview.push_str(&format!("[Markdown消息 {snippet}]"));
                }
                Segment::Forward(forward) => {
                    if let Some(resid) = &forward.id {
                        // 已有 resid，直接包卡片
                        let options = ForwardCardOptions {
                            source: forward.source.clone(),
                            news: forward.news.clone(),
                            summary: forward.summary.clone(),
                            prompt: forward.prompt.clone(),
                        };
                        self.children.push(Elem::LightApp {
                            data: forward_card::pack(resid, &options)?,
                        });
                    } else if let Some(content) = &forward.content {
                        if self.depth >= MAX_FORWARD_DEPTH {
                            warn!(target: "Encoder",
                                "合并转发嵌套深度超过 {MAX_FORWARD_DEPTH} 层，将停止解析");
                            return Ok(());
                        }
                        let inner_nodes: Vec<Segment> =
                            content.iter().filter(|s| s.is_node()).cloned().collect();
                        if inner_nodes.is_empty() {
                            warn!(target: "Encoder", "forward content 中没有有效的 node 节点");
                            return Ok(());
                        }
                        let options = ForwardCardOptions {
                            source: forward.source.clone(),
                            news: forward.news.clone(),
                            summary: forward.summary.clone(),
                            prompt: forward.prompt.clone(),
                        };
                        let (resid, options) =
                            self.encode_nested(&inner_nodes, options).await?;
                        self.children.push(Elem::LightApp {
                            data: forward_card::pack(&resid, &options)?,
                        });
                    }
                    self.preview.push_str("[聊天记录]");
                }
                Segment::Node(node) => {
                    let has_nested = node.content.iter().any(Segment::is_node);
                    if has_nested {
                        if self.depth >= MAX_FORWARD_DEPTH {
                            warn!(target: "Encoder",
                                "合并转发嵌套深度超过 {MAX_FORWARD_DEPTH} 层，将停止解析");
                            return Ok(());
                        }
                        let inner_nodes: Vec<Segment> =
                            node.content.iter().filter(|s| s.is_node()).cloned().collect();
                        let options = resolve_nested_options(node, &inner_nodes);
                        let (resid, options) =
                            self.encode_nested(&inner_nodes, options).await?;
                        self.children.push(Elem::LightApp {
                            data: forward_card::pack(&resid, &options)?,
                        });
                        self.preview.push_str("[聊天记录]");
                    } else {
                        // 普通节点，直接渲染内容
                        self.render(&node.content).await?;
                    }

                    self.uin = node.uin.as_deref().and_then(|id| id.parse().ok());
                    self.name = node.name.clone();
                    self.flush();
                }
                // 其余消息段类型仅出现在嵌套节点内容里，由摘要处理，
                // 顶层访问到时不产生元素
                _ => {}
            }
            Ok(())
        })
    }

    /// 递归编码一层嵌套转发：新实例 depth+1 生成、上传换 resid、
    /// 清理文件集并入当前层
    async fn encode_nested(
        &mut self,
        inner_nodes: &[Segment],
        options: ForwardCardOptions,
    ) -> Result<(String, ForwardCardOptions)> {
        let mut inner =
            MessageEncoder::with_depth(self.ctx.clone(), self.peer.clone(), self.depth + 1);
        let bundle = inner.generate(inner_nodes, Some(options.clone())).await?;
        let resid = self
            .ctx
            .forward
            .upload_forward(&self.peer, &bundle.envelopes)
            .await?;
        self.delete_after_sent_files
            .append(&mut inner.delete_after_sent_files);
        Ok((resid, options))
    }

    /// 把缓冲的元素封成一条消息：取显示名、补一条 news (不超过 4 条)、
    /// 发出封包并重置逐条状态
    fn flush(&mut self) {
        if self.children.is_empty() {
            return;
        }

        let nick = self
            .name
            .clone()
            .filter(|n| !n.is_empty())
            .or_else(|| Some(self.ctx.identity.nick.clone()).filter(|n| !n.is_empty()))
            .unwrap_or_else(|| "QQ用户".to_string());

        if self.news.len() < 4 {
            self.news
                .push(NewsEntry::new(format!("{nick}: {}", self.preview)));
        }

        let from_uin = self.uin.unwrap_or(if self.ctx.identity.uin != 0 {
            self.ctx.identity.uin
        } else {
            FALLBACK_UIN
        });
        let routing_head = if self.is_group {
            RoutingHead {
                from_uin,
                c2c: None,
                group: Some(GroupHead {
                    group_code: FALLBACK_GROUP_CODE,
                    group_card: nick,
                }),
            }
        } else {
            RoutingHead {
                from_uin,
                c2c: Some(C2cHead { friend_name: nick }),
                group: None,
            }
        };

        self.results.push(Envelope {
            routing_head,
            content_head: ContentHead {
                msg_type: if self.is_group {
                    MSG_TYPE_GROUP
                } else {
                    MSG_TYPE_C2C
                },
                random: rand::rng().random_range(0..4_294_967_290u32),
                msg_seq: self.seq,
                msg_time: chrono::Utc::now().timestamp(),
                pkg_num: 1,
                pkg_index: 0,
                div_seq: 0,
                forward: ForwardHead::default(),
            },
            body: MsgBody {
                rich_text: RichText {
                    elems: std::mem::take(&mut self.children),
                },
            },
        });

        self.seq += 1;
        self.tsum += 1;
        self.preview.clear();
    }

    /// 富媒体描述 -> serviceType 48 元素
    fn pack_image(&self, descriptor: &MediaDescriptor, busi_type: i32) -> Elem {
        let msg_info = pb::MsgInfo {
            msg_info_body: vec![pb::MsgInfoBody {
                index: Some(pb::IndexNode {
                    info: Some(pb::FileInfo {
                        file_size: descriptor.file_size,
                        md5_hex_str: descriptor.md5.clone(),
                        sha1_hex_str: descriptor.sha1.clone(),
                        file_name: descriptor.file_name.clone(),
                        file_type: Some(pb::FileType {
                            r#type: 1,
                            pic_format: if descriptor.format.is_animated() {
                                2000
                            } else {
                                1000
                            },
                        }),
                        width: descriptor.width,
                        height: descriptor.height,
                        time: 0,
                        original: 1,
                    }),
                    file_uuid: descriptor.file_id.clone(),
                    store_id: 1,
                    expire: if self.is_group { 2_678_400 } else { 157_680_000 },
                }),
                pic: Some(pb::PicInfo {
                    url_path: format!(
                        "/download?appid={}&fileid={}",
                        if self.is_group { 1407 } else { 1406 },
                        descriptor.file_id
                    ),
                    ext: Some(pb::PicUrlExt {
                        original_param: "&spec=0".to_string(),
                        big_param: "&spec=720".to_string(),
                        thumb_param: "&spec=198".to_string(),
                    }),
                    domain: "multimedia.nt.qq.com.cn".to_string(),
                }),
                file_exist: true,
            }],
            ext_biz_info: Some(pb::ExtBizInfo {
                pic: Some(pb::PicExtBizInfo {
                    biz_type: 0,
                    summary: String::new(),
                    from_scene: if self.is_group { 2 } else { 1 },
                    to_scene: if self.is_group { 2 } else { 1 },
                    old_file_id: self.is_group.then_some(574_859_779),
                }),
                busi_type: busi_type.max(0) as u32,
            }),
        };

        Elem::CommonElem {
            service_type: 48,
            pb_elem: msg_info.encode_to_vec(),
            business_type: if self.is_group { 20 } else { 10 },
        }
    }
}

/// 解析节点自带的外显参数，缺省的 news/summary/prompt 按内层节点合成
fn resolve_nested_options(node: &NodeData, inner_nodes: &[Segment]) -> ForwardCardOptions {
    let mut options = ForwardCardOptions {
        source: node.source.clone(),
        news: node.news.clone(),
        summary: node.summary.clone(),
        prompt: node.prompt.clone(),
    };

    if options.news.as_ref().is_none_or(|news| news.is_empty()) {
        options.news = Some(
            inner_nodes
                .iter()
                .take(4)
                .filter_map(|segment| match segment {
                    Segment::Node(inner) => Some(inner),
                    _ => None,
                })
                .map(|inner| {
                    NewsEntry::new(format!("{}: {}", inner.display_name(), content_digest(inner)))
                })
                .collect(),
        );
    }
    if options.summary.is_none() {
        options.summary = Some(format!("查看{}条转发消息", inner_nodes.len()));
    }
    if options.prompt.is_none() {
        options.prompt = Some("[聊天记录]".to_string());
    }
    options
}

/// 按固定的逐类型映射，从节点首个消息段得出内容摘要
fn content_digest(node: &NodeData) -> String {
    let Some(first) = node.content.first() else {
        return "消息".to_string();
    };
    match first {
        Segment::Text { text } => {
            if text.is_empty() {
                "文本消息".to_string()
            } else {
                text.clone()
            }
        }
        Segment::Image(image) => image
            .summary
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "[图片]".to_string()),
        Segment::Face { .. } => "[表情]".to_string(),
        Segment::Mface { .. } => "[商城表情]".to_string(),
        Segment::Video { .. } => "[视频]".to_string(),
        Segment::Record { .. } => "[语音]".to_string(),
        Segment::File { name } => match name.as_deref().filter(|n| !n.is_empty()) {
            Some(name) => format!("[文件]{name}"),
            None => "[文件]".to_string(),
        },
        Segment::FlashFile { title } => match title.as_deref().filter(|t| !t.is_empty()) {
            Some(title) => format!("[闪传]{title}"),
            None => "[闪传]".to_string(),
        },
        Segment::At { qq, name } => {
            if qq == "all" {
                "[@全体成员]".to_string()
            } else {
                format!("[@{}]", name.as_deref().unwrap_or(qq))
            }
        }
        Segment::Reply { .. } => "[回复]".to_string(),
        Segment::Forward(_) => "[转发消息]".to_string(),
        Segment::Node(_) => "[聊天记录]".to_string(),
        Segment::Markdown { content } => format!("[Markdown消息 {content}]"),
        Segment::Json { .. } => "[JSON消息]".to_string(),
        Segment::Music { .. } => "[音乐]".to_string(),
        Segment::Poke { .. } => "[戳一戳]".to_string(),
        Segment::Dice { result } => match result.as_deref() {
            Some(result) => format!("[骰子:{result}]"),
            None => "[骰子]".to_string(),
        },
        Segment::Rps { result } => match result.as_deref() {
            Some(result) => format!("[猜拳:{result}]"),
            None => "[猜拳]".to_string(),
        },
        Segment::Contact { contact_type } => {
            if contact_type == "qq" {
                "[推荐好友]".to_string()
            } else {
                "[推荐群]".to_string()
            }
        }
        Segment::Shake {} => "[窗口抖动]".to_string(),
        Segment::Keyboard {} => "[按钮]".to_string(),
        Segment::Unknown => "[消息]".to_string(),
    }
}
