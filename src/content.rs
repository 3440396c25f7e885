// src/content.rs
// 说明面板：静态文字，与信号处理无关

pub struct Bullet {
    pub text: &'static str,
    pub children: &'static [&'static str],
}

pub struct InfoSection {
    pub title: &'static str,
    pub intro: &'static str,
    pub bullets: &'static [Bullet],
    pub outro_heading: Option<&'static str>,
    pub outro: &'static [&'static str],
}

pub const HRV_SECTION: InfoSection = InfoSection {
    title: "What is HRV (Heart Rate Variability)?",
    intro: "Heart Rate Variability (HRV) is the measure of the variation in time (in milliseconds) \
            between consecutive heartbeats. It's a non-invasive way to assess how well the body's \
            autonomic nervous system (ANS) responds to internal and external stressors.",
    bullets: &[
        Bullet {
            text: "Why it matters:",
            children: &[
                "A higher HRV often indicates a healthy balance between the 'fight-or-flight' \
                 (sympathetic) and 'rest-and-digest' (parasympathetic) branches of the ANS. This can \
                 correlate with better cardiovascular fitness and stress resilience.",
                "A lower HRV can be a sign of fatigue, overtraining (in athletes), or chronic stress. \
                 It may also be associated with certain cardiovascular or metabolic conditions.",
            ],
        },
        Bullet {
            text: "Common uses:",
            children: &[
                "Monitoring stress and recovery in sports and wellness.",
                "Detecting early signs of health issues or tracking chronic conditions.",
                "Biofeedback training, where people learn to regulate HRV to improve relaxation and \
                 stress response.",
            ],
        },
    ],
    outro_heading: None,
    outro: &[],
};

pub const QRS_SECTION: InfoSection = InfoSection {
    title: "What is the QRS Complex?",
    intro: "The QRS Complex on an ECG trace represents the rapid depolarization (electrical \
            activation) of the ventricles, which triggers the main pumping action of the heart. It \
            typically includes three main parts:",
    bullets: &[
        Bullet {
            text: "Q wave: A small negative deflection that appears just before the large R wave.",
            children: &[],
        },
        Bullet {
            text: "R wave: The prominent, tall spike and the most visually recognizable component of \
                   the ECG cycle.",
            children: &[],
        },
        Bullet {
            text: "S wave: A negative deflection following the R wave.",
            children: &[],
        },
    ],
    outro_heading: Some("Why it matters:"),
    outro: &[
        "R-Peaks (the highest point of the QRS Complex) are commonly used to calculate heart rate, \
         as they mark one cardiac cycle.",
        "Shape & Duration of the QRS Complex can help identify conduction abnormalities, \
         ventricular hypertrophy, or arrhythmias.",
        "Accurate detection of QRS complexes is crucial for reliable measurement of Heart Rate \
         Variability (HRV) and for diagnosing various heart conditions.",
    ],
};

pub const SECTIONS: [&InfoSection; 2] = [&HRV_SECTION, &QRS_SECTION];
