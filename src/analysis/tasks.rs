use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the fixed image analysis instructions offered in the task menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisTask {
    SceneAnalysis,
    ObjectDetection,
    ImageCaptioning,
    VisualQuestionAnswering,
    ImageSimilaritySearch,
    ImageSegmentation,
    OpticalCharacterRecognition,
    DiagramUnderstanding,
    ArtAnalysis,
    MedicalImageAnalysis,
}

impl AnalysisTask {
    /// Menu order. The position in this list is the task's ordinal.
    pub const ALL: [AnalysisTask; 10] = [
        AnalysisTask::SceneAnalysis,
        AnalysisTask::ObjectDetection,
        AnalysisTask::ImageCaptioning,
        AnalysisTask::VisualQuestionAnswering,
        AnalysisTask::ImageSimilaritySearch,
        AnalysisTask::ImageSegmentation,
        AnalysisTask::OpticalCharacterRecognition,
        AnalysisTask::DiagramUnderstanding,
        AnalysisTask::ArtAnalysis,
        AnalysisTask::MedicalImageAnalysis,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Self::SceneAnalysis => "scene_analysis",
            Self::ObjectDetection => "object_detection",
            Self::ImageCaptioning => "image_captioning",
            Self::VisualQuestionAnswering => "visual_question_answering",
            Self::ImageSimilaritySearch => "image_similarity_search",
            Self::ImageSegmentation => "image_segmentation",
            Self::OpticalCharacterRecognition => "optical_character_recognition",
            Self::DiagramUnderstanding => "diagram_understanding",
            Self::ArtAnalysis => "art_analysis",
            Self::MedicalImageAnalysis => "medical_image_analysis",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::SceneAnalysis => "Scene Analysis",
            Self::ObjectDetection => "Object Detection and Classification",
            Self::ImageCaptioning => "Image Captioning",
            Self::VisualQuestionAnswering => "Visual Question Answering",
            Self::ImageSimilaritySearch => "Image Similarity Search",
            Self::ImageSegmentation => "Image Segmentation",
            Self::OpticalCharacterRecognition => "Optical Character Recognition (OCR)",
            Self::DiagramUnderstanding => "Diagram Understanding",
            Self::ArtAnalysis => "Art Analysis",
            Self::MedicalImageAnalysis => "Medical Image Analysis",
        }
    }

    /// Full instruction text sent to the model, label included.
    pub fn instruction(self) -> &'static str {
        match self {
            Self::SceneAnalysis => {
                "Scene Analysis: Describe the scene depicted in the image. Identify the objects present, their spatial relationships, and any actions taking place."
            }
            Self::ObjectDetection => {
                "Object Detection and Classification: Identify and classify all objects present in the image. Provide detailed descriptions of each object, including its size, shape, color, and texture."
            }
            Self::ImageCaptioning => {
                "Image Captioning: Generate a concise and accurate caption that describes the content of the image."
            }
            Self::VisualQuestionAnswering => {
                "Visual Question Answering: Answer specific questions about the image, such as 'What color is the car?' or 'How many people are in the image?'"
            }
            Self::ImageSimilaritySearch => {
                "Image Similarity Search: Given a query image, find similar images from a large dataset based on visual features."
            }
            Self::ImageSegmentation => {
                "Image Segmentation: Segment the image into different regions corresponding to objects or areas of interest."
            }
            Self::OpticalCharacterRecognition => {
                "Optical Character Recognition (OCR): Extract text from the image, such as printed or handwritten text."
            }
            Self::DiagramUnderstanding => {
                "Diagram Understanding: Analyze a diagram (e.g., flowchart, circuit diagram) and extract its structure and meaning."
            }
            Self::ArtAnalysis => {
                "Art Analysis: Describe the artistic style, subject matter, and emotional impact of an image."
            }
            Self::MedicalImageAnalysis => {
                "Medical Image Analysis: Analyze medical images (e.g., X-rays, MRIs) to detect abnormalities or diagnose diseases."
            }
        }
    }

    pub fn ordinal(self) -> usize {
        Self::ALL
            .iter()
            .position(|task| *task == self)
            .unwrap_or_default()
    }

    pub fn from_ordinal(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Resolves a menu selection given as an ordinal, id, label or full
    /// instruction. Blank input means nothing was selected.
    pub fn lookup(selection: &str) -> Option<Self> {
        let selection = selection.trim();
        if selection.is_empty() {
            return None;
        }

        if let Ok(index) = selection.parse::<usize>() {
            return Self::from_ordinal(index);
        }

        Self::ALL.into_iter().find(|task| {
            task.id() == selection
                || task.label().eq_ignore_ascii_case(selection)
                || task.instruction() == selection
        })
    }
}

impl fmt::Display for AnalysisTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
