use crate::forward_card::NewsEntry;
use serde::{Deserialize, Serialize};

/// OneBot11 消息段 (Segment)
///
/// 封闭的标签联合：新增消息类型时由编译器保证 match 覆盖。
/// JSON 形态与 OneBot11 一致：`{"type": "...", "data": {...}}`。
/// 编码器只消费消息段，从不修改它。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Segment {
    /// 纯文本
    Text { text: String },
    /// QQ 系统表情
    Face { id: String },
    /// 图片 / 动画表情
    Image(ImageData),
    /// 商城表情
    Mface {
        #[serde(default)]
        summary: Option<String>,
    },
    /// 语音
    Record {
        #[serde(default)]
        file: Option<String>,
    },
    /// 视频
    Video {
        #[serde(default)]
        file: Option<String>,
    },
    /// 文件
    File {
        #[serde(default)]
        name: Option<String>,
    },
    /// 闪传
    #[serde(rename = "flashfile")]
    FlashFile {
        #[serde(default)]
        title: Option<String>,
    },
    /// @某人 (`qq` 为 "all" 时表示 @全体成员)
    At {
        qq: String,
        #[serde(default)]
        name: Option<String>,
    },
    /// 回复引用
    Reply { id: String },
    /// Markdown 消息
    Markdown { content: String },
    /// JSON 消息
    Json {
        #[serde(default)]
        data: Option<String>,
    },
    /// 音乐分享
    Music {
        #[serde(default)]
        id: Option<String>,
    },
    /// 戳一戳
    Poke {
        #[serde(default)]
        qq: Option<String>,
    },
    /// 骰子魔法表情
    Dice {
        #[serde(default)]
        result: Option<String>,
    },
    /// 猜拳魔法表情
    Rps {
        #[serde(default)]
        result: Option<String>,
    },
    /// 推荐好友/群 (`contact_type` 为 "qq" 时是好友)
    Contact {
        #[serde(rename = "type")]
        contact_type: String,
    },
    /// 窗口抖动
    Shake {},
    /// 按钮
    Keyboard {},
    /// 合并转发引用 (已有 resid 或内联节点内容)
    Forward(ForwardData),
    /// 合并转发节点 (一条带发送者归属的消息)
    Node(NodeData),
    /// 未识别的消息段，摘要时按通用 "[消息]" 处理
    #[serde(other)]
    Unknown,
}

impl Segment {
    pub fn text(text: impl Into<String>) -> Self {
        Segment::Text { text: text.into() }
    }

    pub fn is_node(&self) -> bool {
        matches!(self, Segment::Node(_))
    }
}

/// 图片消息段数据
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ImageData {
    /// 文件名、URL、Base64 或本地路径，由媒体解析协作方处理
    pub file: String,
    /// 上传子类型：1 为动画表情，0 为普通图片
    #[serde(default, alias = "subType")]
    pub sub_type: Option<i32>,
    /// 外显摘要
    #[serde(default)]
    pub summary: Option<String>,
}

/// 转发节点数据
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NodeData {
    /// 发送者 QQ 号
    #[serde(default, alias = "user_id")]
    pub uin: Option<String>,
    /// 发送者昵称
    #[serde(default, alias = "nickname")]
    pub name: Option<String>,
    /// 节点内容
    #[serde(default)]
    pub content: Vec<Segment>,
    // 自定义外显参数，仅当 content 内嵌套了 node 时生效
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub news: Option<Vec<NewsEntry>>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
}

impl NodeData {
    /// 发送者显示名，未提供时回落到通用占位
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("QQ用户")
    }
}

/// 转发消息段数据：`id` (已有 resid) 与 `content` (内联节点) 二选一
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ForwardData {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub content: Option<Vec<Segment>>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub news: Option<Vec<NewsEntry>>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
}
